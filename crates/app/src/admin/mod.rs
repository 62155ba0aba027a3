//! Operator authentication

pub mod errors;
pub mod service;
pub mod token;

pub use errors::AdminAuthError;
pub use service::*;
