//! extgate API Library
//!
//! HTTP handlers, error rendering and application setup for the upload
//! gatekeeper.

mod api_doc;
pub mod constants;
mod handlers;
mod services;
pub mod setup;
pub mod telemetry;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
