use rusqlite::{params, Connection, Params, Row};

use crate::error::Result;
use crate::models::{AuthorId, Book, BookId, Tags};
use crate::repository::BookRepository;

use super::{map_sql_error, storage_error};

/// Book and tag persistence on a connection that already has a transaction
/// open. Tags live in `book_tags` and are always rewritten as a whole.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Run a book query and attach each book's tags. Rows are collected before
    /// the tag lookups so only one statement is stepping at a time.
    fn load_books<P: Params>(
        &self,
        sql: &str,
        params: P,
        map_row: fn(&Row<'_>) -> rusqlite::Result<Book>,
    ) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql).map_err(storage_error)?;
        let mut books = stmt
            .query_map(params, map_row)
            .map_err(storage_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_error)?;

        for book in &mut books {
            book.tags = self.book_tags(&book.id)?;
        }

        Ok(books)
    }

    fn book_tags(&self, id: &BookId) -> Result<Tags> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT tag FROM book_tags WHERE book_id = ?1 ORDER BY rowid")
            .map_err(storage_error)?;

        let tags = stmt
            .query_map(params![id], |row| row.get(0))
            .map_err(storage_error)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(storage_error)?;

        Ok(tags)
    }

    /// Delete-all-then-insert; no diffing against the stored set.
    fn replace_tags(&self, id: &BookId, tags: &[String]) -> Result<()> {
        self.delete_book_tags(id)?;

        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO book_tags (book_id, tag) VALUES (?1, ?2)")
            .map_err(storage_error)?;
        for tag in tags {
            stmt.execute(params![id, tag]).map_err(storage_error)?;
        }

        Ok(())
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn save(&self, book: &Book) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO books (id, author_id, title, publication_year)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (id) DO UPDATE SET
                     author_id = excluded.author_id,
                     title = excluded.title,
                     publication_year = excluded.publication_year",
                params![book.id, book.author_id, book.title, book.publication_year],
            )
            .map_err(|err| map_sql_error(err, || "Book author does not exist.".to_string()))?;

        self.replace_tags(&book.id, &book.tags)
    }

    fn get_all_books(&self) -> Result<Vec<Book>> {
        self.load_books(
            "SELECT b.id, b.author_id, b.title, b.publication_year, a.name
             FROM books b
             INNER JOIN authors a ON a.id = b.author_id
             ORDER BY b.title",
            [],
            book_with_author,
        )
    }

    fn get_books_by_author_id(&self, author_id: &AuthorId) -> Result<Vec<Book>> {
        self.load_books(
            "SELECT id, author_id, title, publication_year
             FROM books
             WHERE author_id = ?1
             ORDER BY publication_year, title",
            params![author_id],
            book_without_author,
        )
    }

    fn get_books_by_title(&self, title: &str) -> Result<Vec<Book>> {
        self.load_books(
            "SELECT b.id, b.author_id, b.title, b.publication_year, a.name
             FROM books b
             INNER JOIN authors a ON a.id = b.author_id
             WHERE b.title = ?1
             ORDER BY b.publication_year",
            params![title],
            book_with_author,
        )
    }

    fn delete_book_tags(&self, id: &BookId) -> Result<()> {
        self.conn
            .execute("DELETE FROM book_tags WHERE book_id = ?1", params![id])
            .map_err(storage_error)?;
        Ok(())
    }

    fn delete_book(&self, id: &BookId) -> Result<()> {
        self.conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])
            .map_err(|err| {
                map_sql_error(err, || "Book still has tags; remove them first.".to_string())
            })?;
        Ok(())
    }

    /// Editing a missing id touches nothing, tags included.
    fn edit_book(
        &self,
        id: &BookId,
        title: &str,
        publication_year: i32,
        tags: &[String],
    ) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE books SET title = ?1, publication_year = ?2 WHERE id = ?3",
                params![title, publication_year, id],
            )
            .map_err(storage_error)?;

        if updated == 0 {
            return Ok(());
        }
        self.replace_tags(id, tags)
    }
}

fn book_with_author(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        author_name: row.get(4)?,
        ..book_without_author(row)?
    })
}

fn book_without_author(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book::new(
        row.get(0)?,
        row.get(1)?,
        row.get::<_, String>(2)?,
        row.get(3)?,
        Tags::new(),
    ))
}
