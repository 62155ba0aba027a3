//! Admin auth errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminAuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("admin login is disabled")]
    LoginDisabled,

    #[error("session token is not recognised")]
    InvalidToken,

    #[error("session has expired")]
    Expired,
}
