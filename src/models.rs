//! Domain models that mirror the catalog schema and get passed between the use
//! cases, the repositories and the TUI. They stay light-weight data holders:
//! edits go through a repository call rather than mutating a loaded value, and
//! nothing here knows about SQL.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::CatalogError;

/// Unique identifier tagged with the entity kind it belongs to.
///
/// The tag only exists at the type level, so an [`AuthorId`] and a [`BookId`]
/// built from the same UUID are still different types and cannot be compared
/// or passed in place of each other. The default value is the "unset" (nil)
/// identifier; everything else is a generated or parsed UUID.
pub struct Id<T> {
    value: Uuid,
    kind: PhantomData<fn() -> T>,
}

/// Type-level tag for author identifiers.
#[derive(Debug)]
pub enum AuthorMarker {}

/// Type-level tag for book identifiers.
#[derive(Debug)]
pub enum BookMarker {}

pub type AuthorId = Id<AuthorMarker>;
pub type BookId = Id<BookMarker>;

impl<T> Id<T> {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self {
            value,
            kind: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    /// True for the default identifier that was never assigned.
    pub fn is_unset(&self) -> bool {
        self.value.is_nil()
    }
}

// Manual impls: deriving would put the same bounds on the marker type.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::from_uuid(Uuid::nil())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    /// Canonical hyphenated lowercase form; parsing it yields the same id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.hyphenated())
    }
}

impl<T> FromStr for Id<T> {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self::from_uuid)
            .map_err(|source| CatalogError::InvalidFormat {
                value: s.to_string(),
                source,
            })
    }
}

/// Free-form labels attached to a book, kept in the order they were entered.
pub type Tags = Vec<String>;

/// A writer in the catalog. Name uniqueness is a storage rule, not something
/// this type checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

impl Author {
    pub fn new(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A catalogued book. The struct mirrors a row of `books` plus the rows of
/// `book_tags` that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    /// Must point at an existing author when the book is saved; the foreign
    /// key in the schema enforces it.
    pub author_id: AuthorId,
    pub title: String,
    pub publication_year: i32,
    pub tags: Tags,
    /// Display-only copy of the author's name, filled in by queries that join
    /// the `authors` table. It can be stale after a rename until the next read
    /// and stays empty for queries that skip the join.
    pub author_name: String,
}

impl Book {
    pub fn new(
        id: BookId,
        author_id: AuthorId,
        title: impl Into<String>,
        publication_year: i32,
        tags: Tags,
    ) -> Self {
        Self {
            id,
            author_id,
            title: title.into(),
            publication_year,
            tags,
            author_name: String::new(),
        }
    }

    pub fn with_author_name(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = author_name.into();
        self
    }

    /// Compose a `Title by Author, Year` line, omitting the author part when
    /// the name was not loaded. List views and pickers rely on it.
    pub fn display_title(&self) -> String {
        if self.author_name.trim().is_empty() {
            format!("{}, {}", self.title, self.publication_year)
        } else {
            format!(
                "{} by {}, {}",
                self.title, self.author_name, self.publication_year
            )
        }
    }
}
