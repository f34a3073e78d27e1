//! Application-facing operations. Every call opens its own unit of work, runs
//! one or more repository calls against it and commits. A failing step returns
//! early through `?`, which drops the unit of work and discards its effects.

use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Author, AuthorId, Book, BookId, Tags};
use crate::repository::UnitOfWorkFactory;

pub trait UseCases {
    fn add_author(&self, name: &str) -> Result<Author>;
    fn add_author_with_id(&self, id: AuthorId, name: &str) -> Result<Author>;
    /// Remove an author together with all of their books and tags.
    fn delete_author(&self, id: &AuthorId) -> Result<()>;
    fn edit_author(&self, id: &AuthorId, new_name: &str) -> Result<()>;

    fn get_all_authors(&self) -> Result<Vec<Author>>;
    fn find_author_by_id(&self, id: &AuthorId) -> Result<Option<Author>>;
    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>>;

    fn add_book(
        &self,
        author_id: AuthorId,
        title: &str,
        publication_year: i32,
        tags: Tags,
        author_name: &str,
    ) -> Result<Book>;
    fn delete_book(&self, id: &BookId) -> Result<()>;
    fn edit_book(&self, id: &BookId, title: &str, publication_year: i32, tags: &[String])
        -> Result<()>;

    fn get_all_books(&self) -> Result<Vec<Book>>;
    fn get_books_by_author(&self, author_id: &AuthorId) -> Result<Vec<Book>>;
    fn get_books_by_title(&self, title: &str) -> Result<Vec<Book>>;
}

/// [`UseCases`] implementation on top of any unit-of-work factory.
pub struct Catalog<F> {
    units: F,
}

impl<F: UnitOfWorkFactory> Catalog<F> {
    pub fn new(units: F) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &F {
        &self.units
    }
}

impl<F: UnitOfWorkFactory> UseCases for Catalog<F> {
    fn add_author(&self, name: &str) -> Result<Author> {
        self.add_author_with_id(AuthorId::new(), name)
    }

    fn add_author_with_id(&self, id: AuthorId, name: &str) -> Result<Author> {
        let author = Author::new(id, name);
        let uow = self.units.unit_of_work()?;
        uow.authors().save(&author)?;
        uow.commit()?;
        info!(author_id = %author.id, name = %author.name, "author added");
        Ok(author)
    }

    fn delete_author(&self, id: &AuthorId) -> Result<()> {
        let uow = self.units.unit_of_work()?;
        let books = uow.books().get_books_by_author_id(id)?;
        for book in &books {
            uow.books().delete_book_tags(&book.id)?;
            uow.books().delete_book(&book.id)?;
        }
        uow.authors().delete(id)?;
        uow.commit()?;
        info!(author_id = %id, books = books.len(), "author deleted");
        Ok(())
    }

    fn edit_author(&self, id: &AuthorId, new_name: &str) -> Result<()> {
        let uow = self.units.unit_of_work()?;
        uow.authors().edit(id, new_name)?;
        uow.commit()?;
        info!(author_id = %id, name = %new_name, "author renamed");
        Ok(())
    }

    fn get_all_authors(&self) -> Result<Vec<Author>> {
        let uow = self.units.unit_of_work()?;
        let authors = uow.authors().get_all_authors()?;
        debug!(count = authors.len(), "loaded authors");
        Ok(authors)
    }

    fn find_author_by_id(&self, id: &AuthorId) -> Result<Option<Author>> {
        let uow = self.units.unit_of_work()?;
        uow.authors().find_author_by_id(id)
    }

    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
        let uow = self.units.unit_of_work()?;
        uow.authors().find_author_by_name(name)
    }

    fn add_book(
        &self,
        author_id: AuthorId,
        title: &str,
        publication_year: i32,
        tags: Tags,
        author_name: &str,
    ) -> Result<Book> {
        let book = Book::new(BookId::new(), author_id, title, publication_year, tags)
            .with_author_name(author_name);
        let uow = self.units.unit_of_work()?;
        uow.books().save(&book)?;
        uow.commit()?;
        info!(book_id = %book.id, author_id = %author_id, title = %book.title, "book added");
        Ok(book)
    }

    fn delete_book(&self, id: &BookId) -> Result<()> {
        let uow = self.units.unit_of_work()?;
        uow.books().delete_book_tags(id)?;
        uow.books().delete_book(id)?;
        uow.commit()?;
        info!(book_id = %id, "book deleted");
        Ok(())
    }

    fn edit_book(
        &self,
        id: &BookId,
        title: &str,
        publication_year: i32,
        tags: &[String],
    ) -> Result<()> {
        let uow = self.units.unit_of_work()?;
        uow.books().edit_book(id, title, publication_year, tags)?;
        uow.commit()?;
        info!(book_id = %id, title = %title, "book edited");
        Ok(())
    }

    fn get_all_books(&self) -> Result<Vec<Book>> {
        let uow = self.units.unit_of_work()?;
        let books = uow.books().get_all_books()?;
        debug!(count = books.len(), "loaded books");
        Ok(books)
    }

    fn get_books_by_author(&self, author_id: &AuthorId) -> Result<Vec<Book>> {
        let uow = self.units.unit_of_work()?;
        uow.books().get_books_by_author_id(author_id)
    }

    fn get_books_by_title(&self, title: &str) -> Result<Vec<Book>> {
        let uow = self.units.unit_of_work()?;
        uow.books().get_books_by_title(title)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::error::CatalogError;
    use crate::repository::{AuthorRepository, BookRepository, UnitOfWork};

    /// Committed contents of the fake store.
    #[derive(Clone, Default)]
    struct State {
        authors: Vec<Author>,
        books: Vec<Book>,
    }

    /// In-memory store with transactional staging: every unit of work edits a
    /// private copy that only replaces the shared state on commit.
    #[derive(Default)]
    struct FakeStore {
        committed: RefCell<State>,
        commits: Cell<usize>,
        /// Fail the n-th `delete_book` call (1-based) across the store's life.
        fail_delete_book_at: Cell<Option<usize>>,
        delete_book_calls: Cell<usize>,
        fail_commit: Cell<bool>,
    }

    struct FakeUnit<'a> {
        store: &'a FakeStore,
        staged: RefCell<State>,
    }

    impl UnitOfWorkFactory for FakeStore {
        fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork + '_>> {
            Ok(Box::new(FakeUnit {
                store: self,
                staged: RefCell::new(self.committed.borrow().clone()),
            }))
        }
    }

    impl UnitOfWork for FakeUnit<'_> {
        fn authors(&self) -> &dyn AuthorRepository {
            self
        }

        fn books(&self) -> &dyn BookRepository {
            self
        }

        fn commit(self: Box<Self>) -> Result<()> {
            let FakeUnit { store, staged } = *self;
            if store.fail_commit.get() {
                return Err(CatalogError::transaction_failure("commit refused"));
            }
            *store.committed.borrow_mut() = staged.into_inner();
            store.commits.set(store.commits.get() + 1);
            Ok(())
        }
    }

    impl AuthorRepository for FakeUnit<'_> {
        fn save(&self, author: &Author) -> Result<()> {
            let mut state = self.staged.borrow_mut();
            if state
                .authors
                .iter()
                .any(|a| a.name == author.name && a.id != author.id)
            {
                return Err(CatalogError::constraint_violation(
                    "author name already exists",
                    "UNIQUE constraint failed: authors.name",
                ));
            }
            match state.authors.iter_mut().find(|a| a.id == author.id) {
                Some(existing) => existing.name = author.name.clone(),
                None => state.authors.push(author.clone()),
            }
            Ok(())
        }

        fn delete(&self, id: &AuthorId) -> Result<()> {
            self.staged.borrow_mut().authors.retain(|a| a.id != *id);
            Ok(())
        }

        fn edit(&self, id: &AuthorId, new_name: &str) -> Result<()> {
            if let Some(author) = self
                .staged
                .borrow_mut()
                .authors
                .iter_mut()
                .find(|a| a.id == *id)
            {
                author.name = new_name.to_string();
            }
            Ok(())
        }

        fn get_all_authors(&self) -> Result<Vec<Author>> {
            let mut authors = self.staged.borrow().authors.clone();
            authors.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(authors)
        }

        fn find_author_by_id(&self, id: &AuthorId) -> Result<Option<Author>> {
            Ok(self
                .staged
                .borrow()
                .authors
                .iter()
                .find(|a| a.id == *id)
                .cloned())
        }

        fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
            Ok(self
                .staged
                .borrow()
                .authors
                .iter()
                .find(|a| a.name == name)
                .cloned())
        }
    }

    impl BookRepository for FakeUnit<'_> {
        fn save(&self, book: &Book) -> Result<()> {
            let mut state = self.staged.borrow_mut();
            state.books.retain(|b| b.id != book.id);
            state.books.push(book.clone());
            Ok(())
        }

        fn get_all_books(&self) -> Result<Vec<Book>> {
            let mut books = self.staged.borrow().books.clone();
            books.sort_by(|a, b| a.title.cmp(&b.title));
            Ok(books)
        }

        fn get_books_by_author_id(&self, author_id: &AuthorId) -> Result<Vec<Book>> {
            let mut books: Vec<Book> = self
                .staged
                .borrow()
                .books
                .iter()
                .filter(|b| b.author_id == *author_id)
                .cloned()
                .collect();
            books.sort_by(|a, b| {
                (a.publication_year, &a.title).cmp(&(b.publication_year, &b.title))
            });
            Ok(books)
        }

        fn get_books_by_title(&self, title: &str) -> Result<Vec<Book>> {
            Ok(self
                .staged
                .borrow()
                .books
                .iter()
                .filter(|b| b.title == title)
                .cloned()
                .collect())
        }

        fn delete_book_tags(&self, id: &BookId) -> Result<()> {
            if let Some(book) = self
                .staged
                .borrow_mut()
                .books
                .iter_mut()
                .find(|b| b.id == *id)
            {
                book.tags.clear();
            }
            Ok(())
        }

        fn delete_book(&self, id: &BookId) -> Result<()> {
            let call = self.store.delete_book_calls.get() + 1;
            self.store.delete_book_calls.set(call);
            if self.store.fail_delete_book_at.get() == Some(call) {
                return Err(CatalogError::storage("disk I/O error"));
            }
            self.staged.borrow_mut().books.retain(|b| b.id != *id);
            Ok(())
        }

        fn edit_book(
            &self,
            id: &BookId,
            title: &str,
            publication_year: i32,
            tags: &[String],
        ) -> Result<()> {
            if let Some(book) = self
                .staged
                .borrow_mut()
                .books
                .iter_mut()
                .find(|b| b.id == *id)
            {
                book.title = title.to_string();
                book.publication_year = publication_year;
                book.tags = tags.to_vec();
            }
            Ok(())
        }
    }

    fn tags(values: &[&str]) -> Tags {
        values.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_add_author_assigns_id_and_commits() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);

        let author = catalog.add_author("Joanne Rowling").unwrap();

        assert!(!author.id.is_unset());
        assert_eq!(store.commits.get(), 1);
        let committed = store.committed.borrow();
        assert_eq!(committed.authors.len(), 1);
        assert_eq!(committed.authors[0].name, "Joanne Rowling");
        assert_eq!(committed.authors[0].id, author.id);
    }

    #[test]
    fn test_add_author_with_chosen_id() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        let id = AuthorId::new();

        catalog.add_author_with_id(id, "Jack London").unwrap();

        let found = catalog.find_author_by_id(&id).unwrap().unwrap();
        assert_eq!(found.name, "Jack London");
    }

    #[test]
    fn test_add_book_to_author() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        let author = catalog.add_author("Jack London").unwrap();

        let book = catalog
            .add_book(author.id, "White Fang", 1906, tags(&["Adventure"]), "Jack London")
            .unwrap();

        assert!(!book.id.is_unset());
        assert_eq!(book.author_name, "Jack London");
        let books = catalog.get_books_by_author(&author.id).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "White Fang");
        assert_eq!(books[0].author_id, author.id);
    }

    #[test]
    fn test_list_authors() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        catalog.add_author("Author B").unwrap();
        catalog.add_author("Author A").unwrap();

        let names: Vec<String> = catalog
            .get_all_authors()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, vec!["Author A", "Author B"]);
    }

    #[test]
    fn test_reads_do_not_commit() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);

        catalog.get_all_authors().unwrap();
        catalog.get_all_books().unwrap();
        catalog.find_author_by_name("nobody").unwrap();
        catalog.get_books_by_title("nothing").unwrap();

        assert_eq!(store.commits.get(), 0);
    }

    #[test]
    fn test_find_missing_author_is_none() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);

        assert!(catalog.find_author_by_id(&AuthorId::new()).unwrap().is_none());
        assert!(catalog.find_author_by_name("Nobody").unwrap().is_none());
    }

    #[test]
    fn test_delete_author_cascades_in_one_commit() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        let london = catalog.add_author("Jack London").unwrap();
        let twain = catalog.add_author("Mark Twain").unwrap();
        catalog
            .add_book(london.id, "White Fang", 1906, tags(&["Adventure"]), "Jack London")
            .unwrap();
        catalog
            .add_book(london.id, "The Call of the Wild", 1903, vec![], "Jack London")
            .unwrap();
        catalog
            .add_book(twain.id, "Tom Sawyer", 1876, vec![], "Mark Twain")
            .unwrap();
        let commits_before = store.commits.get();

        catalog.delete_author(&london.id).unwrap();

        assert_eq!(store.commits.get(), commits_before + 1);
        let committed = store.committed.borrow();
        assert_eq!(committed.authors.len(), 1);
        assert_eq!(committed.authors[0].id, twain.id);
        assert_eq!(committed.books.len(), 1);
        assert_eq!(committed.books[0].title, "Tom Sawyer");
    }

    #[test]
    fn test_delete_author_failure_leaves_everything_in_place() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        let london = catalog.add_author("Jack London").unwrap();
        for (title, year) in [("White Fang", 1906), ("Martin Eden", 1909), ("The Sea-Wolf", 1904)] {
            catalog
                .add_book(london.id, title, year, tags(&["Novel"]), "Jack London")
                .unwrap();
        }
        let commits_before = store.commits.get();
        store.fail_delete_book_at.set(Some(2));

        let err = catalog.delete_author(&london.id).unwrap_err();

        assert!(matches!(err, CatalogError::Storage { .. }));
        assert_eq!(store.commits.get(), commits_before);
        let committed = store.committed.borrow();
        assert_eq!(committed.authors.len(), 1);
        assert_eq!(committed.books.len(), 3);
        assert!(committed.books.iter().all(|b| b.tags == tags(&["Novel"])));
    }

    #[test]
    fn test_commit_failure_propagates() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        store.fail_commit.set(true);

        let err = catalog.add_author("Jack London").unwrap_err();

        assert!(matches!(err, CatalogError::TransactionFailure { .. }));
        assert!(store.committed.borrow().authors.is_empty());
    }

    #[test]
    fn test_constraint_violation_surfaces_unchanged() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        catalog.add_author("Jack London").unwrap();

        let err = catalog.add_author("Jack London").unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(store.committed.borrow().authors.len(), 1);
    }

    #[test]
    fn test_edit_book_replaces_tags() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        let author = catalog.add_author("Jack London").unwrap();
        let book = catalog
            .add_book(author.id, "White Fang", 1906, vec![], "Jack London")
            .unwrap();

        catalog
            .edit_book(&book.id, "White Fang", 1906, &tags(&["a", "b"]))
            .unwrap();
        catalog.edit_book(&book.id, "White Fang", 1906, &tags(&["c"])).unwrap();

        let books = catalog.get_books_by_author(&author.id).unwrap();
        assert_eq!(books[0].tags, tags(&["c"]));
    }

    #[test]
    fn test_delete_book_removes_only_that_book() {
        let store = FakeStore::default();
        let catalog = Catalog::new(&store);
        let author = catalog.add_author("Jack London").unwrap();
        let fang = catalog
            .add_book(author.id, "White Fang", 1906, vec![], "Jack London")
            .unwrap();
        catalog
            .add_book(author.id, "Martin Eden", 1909, vec![], "Jack London")
            .unwrap();

        catalog.delete_book(&fang.id).unwrap();

        let titles: Vec<String> = catalog
            .get_all_books()
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Martin Eden"]);
        assert!(catalog.find_author_by_id(&author.id).unwrap().is_some());
    }
}
