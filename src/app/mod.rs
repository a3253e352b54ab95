// ctail - app/mod.rs
//
// Application layer: target resolution, the tail engine, the session loop,
// pipe mode, cancellation.
// Dependencies: core, platform.
// Must NOT depend on: ui. Output goes through the `sink::LineSink` trait.

pub mod cancel;
pub mod pipe;
pub mod resolver;
pub mod session;
pub mod sink;
pub mod tail;
