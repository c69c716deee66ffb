//! Brazilian postal code (CEP) lookup through a priority-ordered chain of
//! remote providers, with a CLI and an optional HTTP API on top.

pub mod config;
pub mod lookup;
pub mod server;
