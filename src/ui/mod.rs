// ctail - ui/mod.rs
//
// UI layer: presentation only. Colour palette, line formatting, and the
// terminal sink.
// Dependencies: app (sink trait), core (grammars, models), regex.
// Must NOT depend on: platform.

pub mod console;
pub mod formatter;
pub mod theme;
