//! Persistence contracts the use cases are written against. Storage adapters
//! (see [`crate::db`]) implement them; tests swap in fakes.

use crate::error::Result;
use crate::models::{Author, AuthorId, Book, BookId};

pub trait AuthorRepository {
    /// Insert the author, or overwrite the name if the id already exists.
    fn save(&self, author: &Author) -> Result<()>;
    /// Remove the author. Deleting a missing id is not an error.
    fn delete(&self, id: &AuthorId) -> Result<()>;
    /// Rename an author. Editing a missing id is not an error.
    fn edit(&self, id: &AuthorId, new_name: &str) -> Result<()>;

    /// Every author, ordered by name.
    fn get_all_authors(&self) -> Result<Vec<Author>>;
    fn find_author_by_id(&self, id: &AuthorId) -> Result<Option<Author>>;
    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>>;
}

pub trait BookRepository {
    /// Upsert the book row and replace its whole tag set.
    fn save(&self, book: &Book) -> Result<()>;
    /// Every book with its author's name, ordered by title.
    fn get_all_books(&self) -> Result<Vec<Book>>;
    /// Books of one author ordered by publication year, then title. The
    /// author name is left empty; the caller already knows it.
    fn get_books_by_author_id(&self, author_id: &AuthorId) -> Result<Vec<Book>>;
    /// Exact title matches with author names, ordered by publication year.
    fn get_books_by_title(&self, title: &str) -> Result<Vec<Book>>;
    /// Must run before [`BookRepository::delete_book`] for the same id; tag
    /// rows reference the book row.
    fn delete_book_tags(&self, id: &BookId) -> Result<()>;
    fn delete_book(&self, id: &BookId) -> Result<()>;
    /// Update title and year and replace the tags. The author is left alone.
    fn edit_book(&self, id: &BookId, title: &str, publication_year: i32, tags: &[String])
        -> Result<()>;
}

/// One transaction's worth of repository access.
///
/// Both repositories share the same transaction. Dropping the unit of work
/// without calling [`UnitOfWork::commit`] discards everything it did.
pub trait UnitOfWork {
    fn authors(&self) -> &dyn AuthorRepository;
    fn books(&self) -> &dyn BookRepository;

    /// Make every change issued through this unit of work visible to later
    /// units of work.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Hands out a fresh [`UnitOfWork`] for every use-case call.
pub trait UnitOfWorkFactory {
    fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork + '_>>;
}

impl<F: UnitOfWorkFactory + ?Sized> UnitOfWorkFactory for &F {
    fn unit_of_work(&self) -> Result<Box<dyn UnitOfWork + '_>> {
        (**self).unit_of_work()
    }
}
