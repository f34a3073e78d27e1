use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Author, Book, Tags};

use super::helpers::{format_tags, normalize_input, prepare_tags};

/// Single-field form used to add or rename an author.
#[derive(Default, Clone)]
pub(crate) struct AuthorForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl AuthorForm {
    pub(crate) fn from_author(author: &Author) -> Self {
        Self {
            name: author.name.clone(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn parse_name(&self) -> Result<String> {
        let name = normalize_input(&self.name);
        if name.is_empty() {
            return Err(anyhow!("Author name is required."));
        }
        Ok(name)
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line("Name", &self.name, true, "<required>")
    }
}

/// Fields available within the book form.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Year,
    Author,
    Tags,
}

/// Validated input of the "add book" form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NewBook {
    pub(crate) title: String,
    pub(crate) publication_year: i32,
    pub(crate) author_name: String,
    pub(crate) tags: Tags,
}

/// Validated input of the "edit book" form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BookChanges {
    pub(crate) title: String,
    pub(crate) publication_year: i32,
    pub(crate) tags: Tags,
}

/// Form state for book creation and editing. When editing, the author field
/// is hidden (a book never changes author) and blank title or year fields fall
/// back to the values the book already has.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) year: String,
    pub(crate) author: String,
    pub(crate) tags: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    current: Option<Book>,
}

impl BookForm {
    /// Blank form, optionally with the author already filled in.
    pub(crate) fn for_author(author: Option<&Author>) -> Self {
        Self {
            author: author.map(|a| a.name.clone()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Populate the form from an existing book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            year: book.publication_year.to_string(),
            author: book.author_name.clone(),
            tags: format_tags(&book.tags),
            active: BookField::Title,
            error: None,
            current: Some(book.clone()),
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.current.is_some()
    }

    /// Fields shown for this form, in focus order.
    pub(crate) fn fields(&self) -> &'static [BookField] {
        if self.is_editing() {
            &[BookField::Title, BookField::Year, BookField::Tags]
        } else {
            &[BookField::Title, BookField::Year, BookField::Author, BookField::Tags]
        }
    }

    /// Move focus to the next visible field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    pub(crate) fn previous_field(&mut self) {
        let count = self.fields().len();
        self.shift_focus(count - 1);
    }

    fn shift_focus(&mut self, by: usize) {
        let fields = self.fields();
        let position = fields.iter().position(|f| *f == self.active).unwrap_or(0);
        self.active = fields[(position + by) % fields.len()];
    }

    /// Insert a character into the active field. The year only takes digits
    /// and a leading minus sign.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Year => {
                if ch.is_ascii_digit() || (ch == '-' && self.year.is_empty()) {
                    self.year.push(ch);
                } else {
                    return false;
                }
            }
            BookField::Author => self.author.push(ch),
            BookField::Tags => self.tags.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Tags => {
                self.tags.pop();
            }
        }
    }

    /// Validate the "add book" inputs.
    pub(crate) fn parse_new(&self) -> Result<NewBook> {
        let title = normalize_input(&self.title);
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let publication_year = parse_year(&self.year)?;
        let author_name = normalize_input(&self.author);
        if author_name.is_empty() {
            return Err(anyhow!("Author name is required."));
        }
        Ok(NewBook {
            title,
            publication_year,
            author_name,
            tags: prepare_tags(&self.tags),
        })
    }

    /// Validate the "edit book" inputs against the book being edited.
    pub(crate) fn parse_changes(&self) -> Result<BookChanges> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| anyhow!("No book is being edited."))?;

        let title = normalize_input(&self.title);
        let title = if title.is_empty() {
            current.title.clone()
        } else {
            title
        };
        let publication_year = if self.year.trim().is_empty() {
            current.publication_year
        } else {
            parse_year(&self.year)?
        };

        Ok(BookChanges {
            title,
            publication_year,
            tags: prepare_tags(&self.tags),
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let (label, value, placeholder) = match field {
            BookField::Title => ("Title", &self.title, self.keep_or("<required>")),
            BookField::Year => ("Year", &self.year, self.keep_or("<required>")),
            BookField::Author => ("Author", &self.author, "<required>"),
            BookField::Tags => ("Tags", &self.tags, "<comma separated, optional>"),
        };
        field_line(label, value, self.active == field, placeholder)
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Year => self.year.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Tags => self.tags.chars().count(),
        }
    }

    pub(crate) fn label(field: BookField) -> &'static str {
        match field {
            BookField::Title => "Title",
            BookField::Year => "Year",
            BookField::Author => "Author",
            BookField::Tags => "Tags",
        }
    }

    fn keep_or(&self, placeholder: &'static str) -> &'static str {
        if self.is_editing() {
            "<keep current>"
        } else {
            placeholder
        }
    }
}

fn parse_year(raw: &str) -> Result<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("Publication year is required."));
    }
    raw.parse::<i32>()
        .context("Publication year must be an integer.")
}

fn field_line(label: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

#[derive(Clone)]
pub(crate) struct ConfirmAuthorDelete {
    pub(crate) author: Author,
    pub(crate) book_count: usize,
}

#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) book: Book,
}

/// Raised when the book form names an author that is not in the catalog yet.
/// Keeps the form so declining returns the user to it untouched.
#[derive(Clone)]
pub(crate) struct ConfirmNewAuthor {
    pub(crate) draft: NewBook,
    pub(crate) form: BookForm,
}
