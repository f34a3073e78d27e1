use std::collections::HashSet;

use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::models::{Book, Tags};

/// Trim the ends of a name, title or search query. Inner spacing is kept.
pub(crate) fn normalize_input(raw: &str) -> String {
    raw.trim().to_string()
}

/// Collapse whitespace runs into single spaces and trim the ends.
fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn a comma separated line into tags: each piece has its whitespace
/// collapsed, empties are dropped and repeats are skipped, keeping the first
/// occurrence in place.
pub(crate) fn prepare_tags(raw: &str) -> Tags {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(collapse_whitespace)
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

pub(crate) fn format_tags(tags: &[String]) -> String {
    tags.join(", ")
}

/// Order used by every book list: title, then author name, then year.
pub(crate) fn sort_for_display(books: &mut [Book]) {
    books.sort_by(|a, b| {
        (&a.title, &a.author_name, a.publication_year).cmp(&(
            &b.title,
            &b.author_name,
            b.publication_year,
        ))
    });
}

/// Clamp `selected + offset` into `0..len`.
pub(crate) fn step_selection(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as isize - 1;
    (selected as isize + offset).clamp(0, max) as usize
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error. Catalog
/// errors put the user-facing wording on the outermost layer, so stop there
/// when one is present.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(catalog) = err.downcast_ref::<crate::error::CatalogError>() {
        if catalog.is_constraint_violation() {
            return catalog.to_string();
        }
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
