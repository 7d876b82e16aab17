//! HTTP intent surface for the presentation layer.

pub mod handlers;
pub mod server;
pub mod types;
