//! Terminal user interface: screens for browsing authors and books, modal
//! forms for editing them and the crossterm event loop driving it all.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
