// ctail - ui/theme.rs
//
// ANSI colour palette for formatted log fields and diagnostics.
// No dependencies on app state or business logic.

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

// -- CiLog / simple log fields --
pub const NAME: &str = "\x1b[0m";
pub const ID: &str = "\x1b[0m";
pub const DATE: &str = "\x1b[1;34m";
pub const TIME: &str = "\x1b[1;36m";
pub const LEVEL: &str = "\x1b[0;38;05;81m";
pub const SECTION: &str = "\x1b[0m";
pub const CODE: &str = "\x1b[0;32m";
pub const DESCRIPTION: &str = "\x1b[0;38;05;187m";
pub const ERROR: &str = "\x1b[0;38;05;161m";

// -- Inline decorations --
/// Text inside `[...]`.
pub const KEYWORD: &str = "\x1b[0;38;05;208m";
/// Text inside `(...)`.
pub const VALUE: &str = "\x1b[0;33m";

// -- General purpose --
pub const OK: &str = "\x1b[0;38;05;118m";
pub const BLUE: &str = "\x1b[0;38;05;081m";
pub const PINK_BOLD: &str = "\x1b[1;38;05;161m";
pub const GREEN: &str = "\x1b[0;38;05;118m";

/// Wrap `text` in `colour` and a trailing reset.
pub fn paint(colour: &str, text: &str) -> String {
    let mut s = String::with_capacity(colour.len() + text.len() + RESET.len());
    s.push_str(colour);
    s.push_str(text);
    s.push_str(RESET);
    s
}
