use std::mem;

use anyhow::{anyhow, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::models::{AuthorId, Book, BookId};
use crate::use_cases::UseCases;

use super::forms::{
    AuthorForm, BookForm, ConfirmAuthorDelete, ConfirmBookDelete, ConfirmNewAuthor, NewBook,
};
use super::helpers::{centered_rect, format_tags, normalize_input, surface_error};
use super::screens::{AuthorsScreen, BookSource, BooksScreen, SearchState};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 5;

/// High-level navigation states.
enum Screen {
    Authors,
    Books(BooksScreen),
}

/// Fine-grained modes layered over the current screen. Every mode except
/// `Normal` draws a popup and captures the keyboard.
enum Mode {
    Normal,
    AddingAuthor(AuthorForm),
    EditingAuthor { id: AuthorId, form: AuthorForm },
    ConfirmAuthorDelete(ConfirmAuthorDelete),
    AddingBook(BookForm),
    ConfirmNewAuthor(ConfirmNewAuthor),
    EditingBook { id: BookId, form: BookForm },
    ConfirmBookDelete(ConfirmBookDelete),
    FindingTitle(SearchState),
    ShowingBook(Book),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    catalog: Box<dyn UseCases>,
    authors: AuthorsScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Box<dyn UseCases>) -> Result<Self> {
        let authors = AuthorsScreen::load(catalog.as_ref())?;
        Ok(Self {
            catalog,
            authors,
            screen: Screen::Authors,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Feed one key press through the active mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let mode = match mode {
            Mode::Normal => {
                let handled = match self.screen {
                    Screen::Authors => self.handle_authors_key(code, &mut exit),
                    Screen::Books(_) => self.handle_books_key(code, &mut exit),
                };
                self.recover(handled)
            }
            Mode::AddingAuthor(form) => self.handle_author_form(code, None, form),
            Mode::EditingAuthor { id, form } => self.handle_author_form(code, Some(id), form),
            Mode::ConfirmAuthorDelete(confirm) => self.handle_confirm_author_delete(code, confirm),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::ConfirmNewAuthor(confirm) => self.handle_confirm_new_author(code, confirm),
            Mode::EditingBook { id, form } => self.handle_edit_book(code, id, form),
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_book_delete(code, confirm),
            Mode::FindingTitle(state) => {
                let handled = self.handle_find_title(code, state);
                self.recover(handled)
            }
            Mode::ShowingBook(book) => self.handle_show_book(code, book),
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Failed reads land in the status line and drop back to the list.
    fn recover(&mut self, handled: Result<Mode>) -> Mode {
        handled.unwrap_or_else(|err| {
            self.report_error(&err);
            Mode::Normal
        })
    }

    fn handle_authors_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.authors.move_selection(-1),
            KeyCode::Down => self.authors.move_selection(1),
            KeyCode::PageUp => self.authors.move_selection(-PAGE),
            KeyCode::PageDown => self.authors.move_selection(PAGE),
            KeyCode::Home => self.authors.select_first(),
            KeyCode::End => self.authors.select_last(),
            KeyCode::Enter => match self.authors.current_author().cloned() {
                Some(author) => {
                    self.clear_status();
                    self.open_books(BookSource::ByAuthor(author))?;
                }
                None => self.set_status("No author selected.", StatusKind::Error),
            },
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.clear_status();
                self.open_books(BookSource::All)?;
            }
            KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::FindingTitle(SearchState::default()));
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingAuthor(AuthorForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match self.authors.current_author() {
                Some(author) => {
                    let mode = Mode::EditingAuthor {
                        id: author.id,
                        form: AuthorForm::from_author(author),
                    };
                    self.clear_status();
                    return Ok(mode);
                }
                None => self.set_status("No author selected to edit.", StatusKind::Error),
            },
            KeyCode::Char('-') => match self.authors.current_author().cloned() {
                Some(author) => {
                    let book_count = self.catalog.get_books_by_author(&author.id)?.len();
                    self.clear_status();
                    return Ok(Mode::ConfirmAuthorDelete(ConfirmAuthorDelete {
                        author,
                        book_count,
                    }));
                }
                None => self.set_status("No author selected to delete.", StatusKind::Error),
            },
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                let form = BookForm::for_author(self.authors.current_author());
                return Ok(Mode::AddingBook(form));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_books_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Books(books) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                self.screen = Screen::Authors;
                self.clear_status();
            }
            KeyCode::Up => books.move_selection(-1),
            KeyCode::Down => books.move_selection(1),
            KeyCode::PageUp => books.move_selection(-PAGE),
            KeyCode::PageDown => books.move_selection(PAGE),
            KeyCode::Home => books.select_first(),
            KeyCode::End => books.select_last(),
            KeyCode::Enter => match books.current_book().cloned() {
                Some(book) => return Ok(Mode::ShowingBook(book)),
                None => self.set_status("No book selected.", StatusKind::Error),
            },
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                let form = BookForm::for_author(books.source.author());
                self.clear_status();
                return Ok(Mode::AddingBook(form));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match books.current_book() {
                Some(book) => {
                    let mode = Mode::EditingBook {
                        id: book.id,
                        form: BookForm::from_book(book),
                    };
                    self.clear_status();
                    return Ok(mode);
                }
                None => self.set_status("No book selected to edit.", StatusKind::Error),
            },
            KeyCode::Char('-') => match books.current_book().cloned() {
                Some(book) => {
                    self.clear_status();
                    return Ok(Mode::ConfirmBookDelete(ConfirmBookDelete { book }));
                }
                None => self.set_status("No book selected to delete.", StatusKind::Error),
            },
            KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::FindingTitle(SearchState::default()));
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.clear_status();
                self.open_books(BookSource::All)?;
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_author_form(&mut self, code: KeyCode, id: Option<AuthorId>, mut form: AuthorForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_author(id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        match (keep_open, id) {
            (false, _) => Mode::Normal,
            (true, Some(id)) => Mode::EditingAuthor { id, form },
            (true, None) => Mode::AddingAuthor(form),
        }
    }

    fn handle_confirm_author_delete(&mut self, code: KeyCode, confirm: ConfirmAuthorDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_author_delete(&confirm) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.report_error(&err);
                        Mode::ConfirmAuthorDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmAuthorDelete(confirm),
        }
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let outcome = form.parse_new().and_then(|draft| {
                    let author = self.catalog.find_author_by_name(&draft.author_name)?;
                    Ok((draft, author))
                });
                match outcome {
                    Ok((draft, Some(author))) => {
                        match self.save_new_book(author.id, &author.name, draft) {
                            Ok(()) => return Mode::Normal,
                            Err(err) => form.error = Some(self.report_error(&err)),
                        }
                    }
                    Ok((draft, None)) => {
                        self.clear_status();
                        return Mode::ConfirmNewAuthor(ConfirmNewAuthor { draft, form });
                    }
                    Err(err) => form.error = Some(self.report_error(&err)),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingBook(form)
    }

    fn handle_confirm_new_author(&mut self, code: KeyCode, confirm: ConfirmNewAuthor) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Author not added.", StatusKind::Info);
                Mode::AddingBook(confirm.form)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let ConfirmNewAuthor { draft, mut form } = confirm;
                let id = AuthorId::new();
                let name = draft.author_name.clone();
                let saved = self
                    .catalog
                    .add_author_with_id(id, &name)
                    .map_err(anyhow::Error::from)
                    .and_then(|_| self.save_new_book(id, &name, draft));
                match saved {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        form.error = Some(self.report_error(&err));
                        Mode::AddingBook(form)
                    }
                }
            }
            _ => Mode::ConfirmNewAuthor(confirm),
        }
    }

    fn handle_edit_book(&mut self, code: KeyCode, id: BookId, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_book_changes(&id, &form) {
                Ok(()) => return Mode::Normal,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingBook { id, form }
    }

    fn handle_confirm_book_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_book_delete(&confirm.book) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.report_error(&err);
                        Mode::ConfirmBookDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmBookDelete(confirm),
        }
    }

    fn handle_find_title(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Enter => {
                let title = normalize_input(&state.query);
                if title.is_empty() {
                    self.set_status("Enter a title to look up.", StatusKind::Error);
                    return Ok(Mode::FindingTitle(state));
                }

                let results = BooksScreen::load(self.catalog.as_ref(), BookSource::ByTitle(title.clone()))?;
                if results.books.is_empty() {
                    self.set_status(format!("No books titled \"{title}\"."), StatusKind::Error);
                    return Ok(Mode::Normal);
                }

                self.clear_status();
                let single = match results.books.as_slice() {
                    [only] => Some(only.clone()),
                    _ => None,
                };
                self.screen = Screen::Books(results);
                return Ok(match single {
                    Some(book) => Mode::ShowingBook(book),
                    None => Mode::Normal,
                });
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }
        Ok(Mode::FindingTitle(state))
    }

    fn handle_show_book(&mut self, code: KeyCode, book: Book) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
            KeyCode::Char('e') | KeyCode::Char('E') => Mode::EditingBook {
                id: book.id,
                form: BookForm::from_book(&book),
            },
            KeyCode::Char('-') => Mode::ConfirmBookDelete(ConfirmBookDelete { book }),
            _ => Mode::ShowingBook(book),
        }
    }

    fn save_author(&mut self, id: Option<AuthorId>, form: &AuthorForm) -> Result<()> {
        let name = form.parse_name()?;
        match id {
            None => {
                if self.catalog.find_author_by_name(&name)?.is_some() {
                    return Err(anyhow!("This author already exists."));
                }
                let author = self.catalog.add_author(&name)?;
                self.authors.reload(self.catalog.as_ref(), Some(author.id))?;
                self.set_status(format!("Added {name}."), StatusKind::Info);
            }
            Some(id) => {
                self.catalog.edit_author(&id, &name)?;
                self.authors.reload(self.catalog.as_ref(), Some(id))?;
                if let Screen::Books(books) = &mut self.screen {
                    if let BookSource::ByAuthor(author) = &mut books.source {
                        if author.id == id {
                            author.name = name.clone();
                        }
                    }
                }
                self.refresh_books()?;
                self.set_status(format!("Renamed author to {name}."), StatusKind::Info);
            }
        }
        Ok(())
    }

    fn perform_author_delete(&mut self, confirm: &ConfirmAuthorDelete) -> Result<()> {
        self.catalog.delete_author(&confirm.author.id)?;
        self.authors.reload(self.catalog.as_ref(), None)?;

        let viewing_deleted = matches!(
            &self.screen,
            Screen::Books(books) if books.source.author().map(|a| a.id) == Some(confirm.author.id)
        );
        if viewing_deleted {
            self.screen = Screen::Authors;
        } else {
            self.refresh_books()?;
        }

        let books_label = if confirm.book_count == 1 { "book" } else { "books" };
        self.set_status(
            format!(
                "Deleted {} and {} {}.",
                confirm.author.name, confirm.book_count, books_label
            ),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_new_book(&mut self, author_id: AuthorId, author_name: &str, draft: NewBook) -> Result<()> {
        let NewBook {
            title,
            publication_year,
            tags,
            ..
        } = draft;
        let book = self
            .catalog
            .add_book(author_id, &title, publication_year, tags, author_name)?;
        self.authors.reload(self.catalog.as_ref(), None)?;
        self.refresh_books()?;
        self.set_status(format!("Added {}.", book.display_title()), StatusKind::Info);
        Ok(())
    }

    fn save_book_changes(&mut self, id: &BookId, form: &BookForm) -> Result<()> {
        let changes = form.parse_changes()?;
        self.catalog
            .edit_book(id, &changes.title, changes.publication_year, &changes.tags)?;
        self.refresh_books()?;
        self.set_status("Book updated.", StatusKind::Info);
        Ok(())
    }

    fn perform_book_delete(&mut self, book: &Book) -> Result<()> {
        self.catalog.delete_book(&book.id)?;
        self.refresh_books()?;
        self.set_status(format!("Deleted {}.", book.title), StatusKind::Info);
        Ok(())
    }

    fn open_books(&mut self, source: BookSource) -> Result<()> {
        let books = BooksScreen::load(self.catalog.as_ref(), source)?;
        self.screen = Screen::Books(books);
        Ok(())
    }

    fn refresh_books(&mut self) -> Result<()> {
        if let Screen::Books(books) = &mut self.screen {
            books.reload(self.catalog.as_ref())?;
        }
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Log a failed action, show it in the footer and hand the message back
    /// for the form that triggered it.
    fn report_error(&mut self, err: &anyhow::Error) -> String {
        warn!(error = %format!("{err:#}"), "catalog action failed");
        let message = surface_error(err);
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Authors => self.draw_authors(frame, content_area),
            Screen::Books(books) => self.draw_books(frame, content_area, books),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Normal => {}
            Mode::AddingAuthor(form) => self.draw_author_form(frame, area, "Add Author", form),
            Mode::EditingAuthor { form, .. } => {
                self.draw_author_form(frame, area, "Rename Author", form)
            }
            Mode::ConfirmAuthorDelete(confirm) => {
                let consequence = match confirm.book_count {
                    0 => "The author has no books.".to_string(),
                    1 => "Their book and its tags will be deleted too.".to_string(),
                    n => format!("Their {n} books and all of their tags will be deleted too."),
                };
                self.draw_dialog(
                    frame,
                    area,
                    "Confirm Deletion",
                    vec![
                        Line::from(format!("Delete {}?", confirm.author.name)),
                        Line::from(consequence),
                    ],
                    "Press Y to confirm or N / Esc to cancel.",
                );
            }
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::ConfirmNewAuthor(confirm) => self.draw_dialog(
                frame,
                area,
                "Unknown Author",
                vec![
                    Line::from(format!("No author named {}.", confirm.draft.author_name)),
                    Line::from("Add them to the catalog and save the book?"),
                ],
                "Press Y to add or N / Esc to go back.",
            ),
            Mode::EditingBook { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmBookDelete(confirm) => self.draw_dialog(
                frame,
                area,
                "Confirm Deletion",
                vec![Line::from(format!(
                    "Delete {}?",
                    confirm.book.display_title()
                ))],
                "Press Y to confirm or N / Esc to cancel.",
            ),
            Mode::FindingTitle(state) => self.draw_search_bar(frame, area, state),
            Mode::ShowingBook(book) => self.draw_book_details(frame, area, book),
        }
    }

    fn draw_authors(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Authors ({})", self.authors.authors.len()));

        if self.authors.authors.is_empty() {
            let message = Paragraph::new("No authors yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .authors
            .authors
            .iter()
            .map(|author| ListItem::new(author.name.clone()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.authors.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect, books: &BooksScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", books.source.title(), books.books.len()));

        if books.books.is_empty() {
            let message = Paragraph::new("No books here yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = books
            .books
            .iter()
            .map(|book| ListItem::new(book.display_title()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(books.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingAuthor(_) | Mode::EditingAuthor { .. }) => {
                &[("[Enter]", "Save"), ("[Esc]", "Cancel")]
            }
            (_, Mode::AddingBook(_) | Mode::EditingBook { .. }) => &[
                ("[Tab]", "Next field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (
                _,
                Mode::ConfirmAuthorDelete(_) | Mode::ConfirmBookDelete(_) | Mode::ConfirmNewAuthor(_),
            ) => &[("[Y]", "Yes"), ("[N]", "No")],
            (_, Mode::FindingTitle(_)) => &[("[Enter]", "Find"), ("[Esc]", "Cancel")],
            (_, Mode::ShowingBook(_)) => &[
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[Esc]", "Close"),
            ],
            (Screen::Authors, Mode::Normal) => &[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Books"),
                ("[+]", "Add"),
                ("[e]", "Rename"),
                ("[-]", "Delete"),
                ("[a]", "Add book"),
                ("[b]", "All books"),
                ("[/]", "Find title"),
                ("[q]", "Quit"),
            ],
            (Screen::Books(_), Mode::Normal) => &[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Details"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[b]", "All books"),
                ("[/]", "Find title"),
                ("[Esc]", "Authors"),
                ("[q]", "Quit"),
            ],
        };

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, action) in hints {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_author_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &AuthorForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), Line::from("")];
        lines.push(error_or_hint(
            form.error.as_deref(),
            "Enter to save • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "Name: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.name.chars().count() as u16, inner.y));
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = form.fields();
        let mut lines: Vec<Line> = fields.iter().map(|field| form.build_line(*field)).collect();
        lines.push(Line::from(""));
        lines.push(error_or_hint(
            form.error.as_deref(),
            "Enter to save • Tab to switch • Esc to cancel",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = fields
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = BookForm::label(form.active).len() as u16 + 2;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_dialog(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        hint: &'static str,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_book_details(&self, frame: &mut Frame, area: Rect, book: &Book) {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Title: ", label),
                Span::raw(book.title.clone()),
            ]),
            Line::from(vec![
                Span::styled("Author: ", label),
                Span::raw(book.author_name.clone()),
            ]),
            Line::from(vec![
                Span::styled("Publication year: ", label),
                Span::raw(book.publication_year.to_string()),
            ]),
        ];
        if !book.tags.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Tags: ", label),
                Span::raw(format_tags(&book.tags)),
            ]));
        }

        self.draw_dialog(frame, area, "Book", lines, "Esc to close • e to edit • - to delete");
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Find Book by Title");
        let paragraph = Paragraph::new(Span::raw(format!("Title: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Title: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

fn error_or_hint(error: Option<&str>, hint: &'static str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    }
}
