use anyhow::{Context, Result};

use crate::models::{Author, AuthorId, Book};
use crate::use_cases::UseCases;

use super::helpers::{sort_for_display, step_selection};

/// Sorted author list shown on the start screen.
pub(crate) struct AuthorsScreen {
    pub(crate) authors: Vec<Author>,
    pub(crate) selected: usize,
}

impl AuthorsScreen {
    pub(crate) fn load(catalog: &dyn UseCases) -> Result<Self> {
        let authors = catalog
            .get_all_authors()
            .context("failed to load authors")?;
        Ok(Self {
            authors,
            selected: 0,
        })
    }

    /// Reload from the catalog, keeping the cursor on `focus` when it is still
    /// listed and otherwise clamping it into range.
    pub(crate) fn reload(&mut self, catalog: &dyn UseCases, focus: Option<AuthorId>) -> Result<()> {
        self.authors = catalog
            .get_all_authors()
            .context("failed to reload authors")?;

        if let Some(id) = focus {
            if let Some(idx) = self.authors.iter().position(|a| a.id == id) {
                self.selected = idx;
                return Ok(());
            }
        }
        self.selected = step_selection(self.selected, self.authors.len(), 0);
        Ok(())
    }

    pub(crate) fn current_author(&self) -> Option<&Author> {
        self.authors.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.authors.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.authors.len().saturating_sub(1);
    }
}

/// Where a book list came from; reloading re-runs the same query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum BookSource {
    All,
    ByAuthor(Author),
    ByTitle(String),
}

impl BookSource {
    pub(crate) fn title(&self) -> String {
        match self {
            BookSource::All => "All Books".to_string(),
            BookSource::ByAuthor(author) => format!("Books by {}", author.name),
            BookSource::ByTitle(title) => format!("Books titled \"{title}\""),
        }
    }

    pub(crate) fn author(&self) -> Option<&Author> {
        match self {
            BookSource::ByAuthor(author) => Some(author),
            _ => None,
        }
    }
}

/// Backing state for every book list view.
pub(crate) struct BooksScreen {
    pub(crate) source: BookSource,
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
}

impl BooksScreen {
    pub(crate) fn load(catalog: &dyn UseCases, source: BookSource) -> Result<Self> {
        let books = Self::fetch(catalog, &source)?;
        Ok(Self {
            source,
            books,
            selected: 0,
        })
    }

    pub(crate) fn reload(&mut self, catalog: &dyn UseCases) -> Result<()> {
        self.books = Self::fetch(catalog, &self.source)?;
        self.selected = step_selection(self.selected, self.books.len(), 0);
        Ok(())
    }

    fn fetch(catalog: &dyn UseCases, source: &BookSource) -> Result<Vec<Book>> {
        let mut books = match source {
            BookSource::All => catalog.get_all_books(),
            BookSource::ByAuthor(author) => catalog.get_books_by_author(&author.id).map(|books| {
                // Author queries skip the name join; the screen already knows it.
                books
                    .into_iter()
                    .map(|book| book.with_author_name(author.name.clone()))
                    .collect()
            }),
            BookSource::ByTitle(title) => catalog.get_books_by_title(title),
        }
        .context("failed to load books")?;

        sort_for_display(&mut books);
        Ok(books)
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.books.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }
}

/// State for the "find by title" prompt.
#[derive(Default)]
pub(crate) struct SearchState {
    pub(crate) query: String,
}
