use rocket::{http::Status, response::Responder};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a request.
///
/// Validation failures never appear here directly: validators report
/// through their return values, and endpoints convert those into
/// [`Error::Status`] with the human-readable message.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// Convenience constructor for 400 responses.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    /// Convenience constructor for 404 responses.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        warn!("{self}");
        Err(match self {
            Self::Io(_) | Self::Json(_) => Status::InternalServerError,
            Self::Status(status, _) => status,
        })
    }
}
