//! Terminal UI components
//!
//! Built with ratatui. One screen: the movie card with its countdown.

pub mod countdown;
pub mod game;
pub mod theme;

pub use game::render;
pub use theme::Theme;
