//! SQLite storage adapter split across logical submodules: connection and
//! schema bootstrap, one repository per table family, and the transactional
//! unit of work tying them together.

mod authors;
mod books;
mod connection;
mod unit_of_work;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Error as SqlError, ErrorCode};

use crate::error::CatalogError;
use crate::models::Id;

pub use authors::SqliteAuthorRepository;
pub use books::SqliteBookRepository;
pub use connection::{ensure_schema, Database};
pub use unit_of_work::SqliteUnitOfWork;

// Ids are stored as their canonical text form.
impl<T> ToSql for Id<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl<T> FromSql for Id<T> {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: CatalogError| FromSqlError::Other(Box::new(err)))
    }
}

/// Translate a SQLite failure into the catalog taxonomy, using `message` when
/// the failure was a constraint violation.
fn map_sql_error(err: SqlError, message: impl FnOnce() -> String) -> CatalogError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        CatalogError::constraint_violation(message(), err)
    } else {
        CatalogError::storage(err)
    }
}

/// [`map_sql_error`] for statements with no friendlier wording than SQLite's.
fn storage_error(err: SqlError) -> CatalogError {
    map_sql_error(err, || "constraint violated".to_string())
}
