// ctail - core/mod.rs
//
// Core logic layer: data model, line grammars, event decoding, offsets,
// directory listing.
// Dependencies: util, walkdir/glob for listing, chrono for event times.
// Must NOT depend on: ui, platform, app.

pub mod discovery;
pub mod event;
pub mod grammar;
pub mod model;
pub mod offsets;
