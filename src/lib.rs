// ctail - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// programmatic use. The binary in `main.rs` only wires the CLI to them.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
