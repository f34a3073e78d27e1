//! Library catalog: authors and the books they wrote, each book carrying an
//! ordered list of tags.
//!
//! The crate is layered. [`models`] holds the entities, [`repository`] the
//! storage traits and the unit of work, [`use_cases`] the operations the
//! application performs, and [`db`] the SQLite implementation of the traits.
//! [`ui`] is the terminal front end built on top of [`use_cases::UseCases`].
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod telemetry;
pub mod ui;
pub mod use_cases;

pub use config::Settings;
pub use db::Database;
pub use error::{CatalogError, Result};
pub use models::{Author, AuthorId, Book, BookId, Tags};
pub use repository::{AuthorRepository, BookRepository, UnitOfWork, UnitOfWorkFactory};
pub use use_cases::{Catalog, UseCases};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
