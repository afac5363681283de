//! Text helpers for putting server-supplied strings on a terminal.

mod text;

pub use text::{display_width, one_line, sanitize, truncate_to_width, validate_link};
