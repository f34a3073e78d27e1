use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{Author, AuthorId};
use crate::repository::AuthorRepository;

use super::{map_sql_error, storage_error};

/// Author persistence on a connection that already has a transaction open.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, sql: &str, key: &dyn rusqlite::ToSql) -> Result<Option<Author>> {
        self.conn
            .query_row(sql, [key], |row| {
                Ok(Author {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
            .map_err(storage_error)
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn save(&self, author: &Author) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO authors (id, name) VALUES (?1, ?2)
                 ON CONFLICT (id) DO UPDATE SET name = excluded.name",
                params![author.id, author.name],
            )
            .map_err(|err| map_sql_error(err, || duplicate_name(&author.name)))?;
        Ok(())
    }

    /// Fails with a constraint violation while the author still has books;
    /// callers remove those first.
    fn delete(&self, id: &AuthorId) -> Result<()> {
        self.conn
            .execute("DELETE FROM authors WHERE id = ?1", params![id])
            .map_err(|err| {
                map_sql_error(err, || "Author still has books in the catalog.".to_string())
            })?;
        Ok(())
    }

    fn edit(&self, id: &AuthorId, new_name: &str) -> Result<()> {
        self.conn
            .execute(
                "UPDATE authors SET name = ?1 WHERE id = ?2",
                params![new_name, id],
            )
            .map_err(|err| map_sql_error(err, || duplicate_name(new_name)))?;
        Ok(())
    }

    fn get_all_authors(&self) -> Result<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM authors ORDER BY name")
            .map_err(storage_error)?;

        let authors = stmt
            .query_map([], |row| {
                Ok(Author {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(storage_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_error)?;

        Ok(authors)
    }

    fn find_author_by_id(&self, id: &AuthorId) -> Result<Option<Author>> {
        self.find_one("SELECT id, name FROM authors WHERE id = ?1", id)
    }

    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
        self.find_one("SELECT id, name FROM authors WHERE name = ?1", &name)
    }
}

fn duplicate_name(name: &str) -> String {
    format!("Author {name} already exists.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::CatalogError;
    use crate::repository::UnitOfWorkFactory;

    fn author_rows(db: &Database) -> i64 {
        db.connection()
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_save_twice_keeps_single_row_with_latest_name() {
        let db = Database::open_in_memory().unwrap();
        let id = AuthorId::new();

        let uow = db.unit_of_work().unwrap();
        uow.authors().save(&Author::new(id, "Jack Londn")).unwrap();
        uow.authors().save(&Author::new(id, "Jack London")).unwrap();
        uow.commit().unwrap();

        assert_eq!(author_rows(&db), 1);
        let uow = db.unit_of_work().unwrap();
        let found = uow.authors().find_author_by_id(&id).unwrap().unwrap();
        assert_eq!(found.name, "Jack London");
    }

    #[test]
    fn test_duplicate_name_is_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        let uow = db.unit_of_work().unwrap();
        uow.authors()
            .save(&Author::new(AuthorId::new(), "Mark Twain"))
            .unwrap();

        let err = uow
            .authors()
            .save(&Author::new(AuthorId::new(), "Mark Twain"))
            .unwrap_err();

        match err {
            CatalogError::ConstraintViolation { message, .. } => {
                assert_eq!(message, "Author Mark Twain already exists.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_authors_sorted_by_name() {
        let db = Database::open_in_memory().unwrap();
        let uow = db.unit_of_work().unwrap();
        for name in ["Leo Tolstoy", "Anton Chekhov", "Nikolai Gogol"] {
            uow.authors().save(&Author::new(AuthorId::new(), name)).unwrap();
        }

        let names: Vec<String> = uow
            .authors()
            .get_all_authors()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, vec!["Anton Chekhov", "Leo Tolstoy", "Nikolai Gogol"]);
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let db = Database::open_in_memory().unwrap();
        let uow = db.unit_of_work().unwrap();
        let missing = AuthorId::new();

        uow.authors().delete(&missing).unwrap();
        uow.authors().edit(&missing, "Nobody").unwrap();

        assert!(uow.authors().find_author_by_id(&missing).unwrap().is_none());
        assert!(uow.authors().find_author_by_name("Nobody").unwrap().is_none());
    }

    #[test]
    fn test_edit_renames_author() {
        let db = Database::open_in_memory().unwrap();
        let id = AuthorId::new();
        let uow = db.unit_of_work().unwrap();
        uow.authors().save(&Author::new(id, "Sam Clemens")).unwrap();

        uow.authors().edit(&id, "Mark Twain").unwrap();

        let found = uow.authors().find_author_by_name("Mark Twain").unwrap();
        assert_eq!(found.map(|a| a.id), Some(id));
        assert!(uow
            .authors()
            .find_author_by_name("Sam Clemens")
            .unwrap()
            .is_none());
    }
}
