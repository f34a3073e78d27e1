use rusqlite::{Connection, Transaction};
use tracing::{debug, trace};

use crate::error::{CatalogError, Result};
use crate::repository::{AuthorRepository, BookRepository, UnitOfWork};

use super::authors::SqliteAuthorRepository;
use super::books::SqliteBookRepository;

/// A unit of work backed by one SQLite transaction.
///
/// The repositories talk to the same connection the transaction was opened on,
/// so all of their statements belong to it. `tx` is `None` only after a
/// successful commit; if the value is dropped while it is still `Some`, the
/// transaction's own drop rolls everything back.
pub struct SqliteUnitOfWork<'conn> {
    tx: Option<Transaction<'conn>>,
    authors: SqliteAuthorRepository<'conn>,
    books: SqliteBookRepository<'conn>,
}

impl<'conn> SqliteUnitOfWork<'conn> {
    pub fn begin(conn: &'conn Connection) -> Result<Self> {
        let tx = conn
            .unchecked_transaction()
            .map_err(CatalogError::transaction_failure)?;
        trace!("unit of work opened");
        Ok(Self {
            tx: Some(tx),
            authors: SqliteAuthorRepository::new(conn),
            books: SqliteBookRepository::new(conn),
        })
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn authors(&self) -> &dyn AuthorRepository {
        &self.authors
    }

    fn books(&self) -> &dyn BookRepository {
        &self.books
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().map_err(CatalogError::transaction_failure)?;
            debug!("unit of work committed");
        }
        Ok(())
    }
}

impl Drop for SqliteUnitOfWork<'_> {
    fn drop(&mut self) {
        if self.tx.is_some() {
            trace!("discarding uncommitted unit of work");
        }
    }
}
