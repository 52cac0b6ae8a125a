//! Tubely API Library
//!
//! HTTP handlers, auth, and application setup for the upload service.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
