use library_catalog::{
    AuthorId, Book, BookId, Catalog, CatalogError, Database, UnitOfWorkFactory, UseCases,
};

fn catalog() -> Catalog<Database> {
    Catalog::new(Database::open_in_memory().unwrap())
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

#[test]
fn add_author_then_list() {
    let catalog = catalog();

    let twain = catalog.add_author("Mark Twain").unwrap();
    let london = catalog.add_author("Jack London").unwrap();

    let authors = catalog.get_all_authors().unwrap();
    assert_eq!(authors, vec![london.clone(), twain]);
    assert_eq!(
        catalog.find_author_by_name("Jack London").unwrap(),
        Some(london.clone())
    );
    assert_eq!(catalog.find_author_by_id(&london.id).unwrap(), Some(london));
}

#[test]
fn books_by_author_sorted_by_year_then_title() {
    let catalog = catalog();
    let london = catalog.add_author("Jack London").unwrap();
    catalog
        .add_book(london.id, "White Fang", 1906, vec!["Adventure".into()], &london.name)
        .unwrap();
    catalog
        .add_book(london.id, "The Call of the Wild", 1903, vec![], &london.name)
        .unwrap();
    catalog
        .add_book(london.id, "Martin Eden", 1909, vec![], &london.name)
        .unwrap();
    catalog
        .add_book(london.id, "Before Adam", 1906, vec![], &london.name)
        .unwrap();

    let books = catalog.get_books_by_author(&london.id).unwrap();

    assert_eq!(
        titles(&books),
        vec!["The Call of the Wild", "Before Adam", "White Fang", "Martin Eden"]
    );
    assert_eq!(books[2].tags, vec!["Adventure"]);
}

#[test]
fn delete_author_cascades_to_books_and_tags() {
    let catalog = catalog();
    let london = catalog.add_author("Jack London").unwrap();
    let twain = catalog.add_author("Mark Twain").unwrap();
    catalog
        .add_book(london.id, "White Fang", 1906, vec!["Adventure".into()], &london.name)
        .unwrap();
    catalog
        .add_book(london.id, "Martin Eden", 1909, vec!["Novel".into()], &london.name)
        .unwrap();
    catalog
        .add_book(twain.id, "Roughing It", 1872, vec![], &twain.name)
        .unwrap();

    catalog.delete_author(&london.id).unwrap();

    assert_eq!(catalog.find_author_by_id(&london.id).unwrap(), None);
    assert!(catalog.get_books_by_author(&london.id).unwrap().is_empty());
    assert_eq!(titles(&catalog.get_all_books().unwrap()), vec!["Roughing It"]);

    let conn = catalog.units().connection();
    let orphan_tags: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM book_tags WHERE book_id NOT IN (SELECT id FROM books)",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_tags, 0);
}

#[test]
fn all_books_carry_author_names_and_sort_by_title() {
    let catalog = catalog();
    let london = catalog.add_author("Jack London").unwrap();
    let twain = catalog.add_author("Mark Twain").unwrap();
    catalog
        .add_book(twain.id, "Roughing It", 1872, vec![], &twain.name)
        .unwrap();
    catalog
        .add_book(london.id, "Martin Eden", 1909, vec![], &london.name)
        .unwrap();

    let books = catalog.get_all_books().unwrap();

    assert_eq!(titles(&books), vec!["Martin Eden", "Roughing It"]);
    assert_eq!(books[0].author_name, "Jack London");
    assert_eq!(books[1].author_name, "Mark Twain");
}

#[test]
fn books_by_title_match_exactly() {
    let catalog = catalog();
    let tolstoy = catalog.add_author("Leo Tolstoy").unwrap();
    let other = catalog.add_author("Anonymous").unwrap();
    catalog
        .add_book(tolstoy.id, "Resurrection", 1899, vec![], &tolstoy.name)
        .unwrap();
    catalog
        .add_book(other.id, "Resurrection", 1866, vec![], &other.name)
        .unwrap();
    catalog
        .add_book(other.id, "Resurrection Men", 2002, vec![], &other.name)
        .unwrap();

    let books = catalog.get_books_by_title("Resurrection").unwrap();

    let years: Vec<i32> = books.iter().map(|b| b.publication_year).collect();
    assert_eq!(years, vec![1866, 1899]);
    assert!(catalog.get_books_by_title("resurrection").unwrap().is_empty());
}

#[test]
fn edit_book_replaces_tags_in_given_order() {
    let catalog = catalog();
    let london = catalog.add_author("Jack London").unwrap();
    let book = catalog
        .add_book(
            london.id,
            "White Fang",
            1905,
            vec!["b".into(), "a".into()],
            &london.name,
        )
        .unwrap();

    catalog
        .edit_book(&book.id, "White Fang", 1906, &["z".into(), "c".into()])
        .unwrap();

    let books = catalog.get_books_by_author(&london.id).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].publication_year, 1906);
    assert_eq!(books[0].tags, vec!["z", "c"]);
}

#[test]
fn edit_missing_book_changes_nothing() {
    let catalog = catalog();
    let london = catalog.add_author("Jack London").unwrap();
    catalog
        .add_book(london.id, "White Fang", 1906, vec!["a".into()], &london.name)
        .unwrap();

    catalog
        .edit_book(&BookId::new(), "Other", 2000, &["x".into()])
        .unwrap();

    let books = catalog.get_all_books().unwrap();
    assert_eq!(titles(&books), vec!["White Fang"]);
    let tag_rows: i64 = catalog
        .units()
        .connection()
        .query_row("SELECT COUNT(*) FROM book_tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tag_rows, 1);
}

#[test]
fn add_author_with_id_upserts() {
    let catalog = catalog();
    let id = AuthorId::new();

    catalog.add_author_with_id(id, "Jack Londn").unwrap();
    catalog.add_author_with_id(id, "Jack London").unwrap();

    let authors = catalog.get_all_authors().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].id, id);
    assert_eq!(authors[0].name, "Jack London");
}

#[test]
fn duplicate_author_name_is_a_constraint_violation() {
    let catalog = catalog();
    catalog.add_author("Mark Twain").unwrap();

    let err = catalog.add_author("Mark Twain").unwrap_err();

    assert!(err.is_constraint_violation());
    assert_eq!(err.to_string(), "Author Mark Twain already exists.");
    assert_eq!(catalog.get_all_authors().unwrap().len(), 1);
}

#[test]
fn book_for_unknown_author_is_rejected() {
    let catalog = catalog();

    let err = catalog
        .add_book(AuthorId::new(), "Orphan", 2000, vec![], "Nobody")
        .unwrap_err();

    assert!(err.is_constraint_violation());
    assert!(catalog.get_all_books().unwrap().is_empty());
}

#[test]
fn dropped_unit_of_work_discards_cascade() {
    let db = Database::open_in_memory().unwrap();
    let catalog = Catalog::new(&db);
    let london = catalog.add_author("Jack London").unwrap();
    let book = catalog
        .add_book(london.id, "White Fang", 1906, vec!["Adventure".into()], &london.name)
        .unwrap();

    {
        let uow = db.unit_of_work().unwrap();
        uow.books().delete_book_tags(&book.id).unwrap();
        uow.books().delete_book(&book.id).unwrap();
        uow.authors().delete(&london.id).unwrap();
        assert!(uow.authors().get_all_authors().unwrap().is_empty());
    }

    assert_eq!(catalog.get_all_authors().unwrap(), vec![london.clone()]);
    let books = catalog.get_books_by_author(&london.id).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].tags, vec!["Adventure"]);
}

#[test]
fn nested_unit_of_work_is_a_transaction_failure() {
    let db = Database::open_in_memory().unwrap();

    let _outer = db.unit_of_work().unwrap();
    let err = db.unit_of_work().err().unwrap();

    assert!(matches!(err, CatalogError::TransactionFailure { .. }));
}

#[test]
fn commits_are_visible_to_other_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("catalog.sqlite");
    let writer = Database::open(&path).unwrap();
    let reader = Catalog::new(Database::open(&path).unwrap());

    let uow = writer.unit_of_work().unwrap();
    uow.authors()
        .save(&library_catalog::Author::new(AuthorId::new(), "Jack London"))
        .unwrap();
    assert!(reader.get_all_authors().unwrap().is_empty());

    uow.commit().unwrap();

    let authors = reader.get_all_authors().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].name, "Jack London");
}

#[test]
fn catalog_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite");

    {
        let catalog = Catalog::new(Database::open(&path).unwrap());
        let london = catalog.add_author("Jack London").unwrap();
        catalog
            .add_book(london.id, "White Fang", 1906, vec!["b".into(), "a".into()], &london.name)
            .unwrap();
    }

    let catalog = Catalog::new(Database::open(&path).unwrap());
    let books = catalog.get_all_books().unwrap();
    assert_eq!(titles(&books), vec!["White Fang"]);
    assert_eq!(books[0].author_name, "Jack London");
    assert_eq!(books[0].tags, vec!["b", "a"]);
}
