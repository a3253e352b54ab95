// ctail - platform/mod.rs
//
// Platform abstraction layer: config file location and loading, binary
// sniffing, file identity.
// Dependencies: core model types, util, directories crate.
// Must NOT depend on: app, ui.

pub mod config;
pub mod fs;
