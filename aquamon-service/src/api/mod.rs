//! HTTP API surface.

mod server;
pub mod v0;

pub use server::{SharedState, serve};
