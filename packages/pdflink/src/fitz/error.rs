//! Error handling for pdflink

use thiserror::Error;

/// The main error type for link resolution and object store access
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    Argument(String),
    #[error("Limit exceeded: {0}")]
    Limit(String),
    #[error("Format error: {0}")]
    Format(String),
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The underlying data is not loaded yet; the caller should retry later.
    #[error("Data not yet available: {0}")]
    TryLater(String),
}

impl Error {
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Error::Argument(msg.into())
    }
    pub fn limit<S: Into<String>>(msg: S) -> Self {
        Error::Limit(msg.into())
    }
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        Error::Syntax(msg.into())
    }
    pub fn try_later<S: Into<String>>(msg: S) -> Self {
        Error::TryLater(msg.into())
    }

    /// True for the deferred-load signal that must abort a whole page build.
    pub fn is_try_later(&self) -> bool {
        matches!(self, Error::TryLater(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_format() {
        let e = Error::format("invalid format");
        assert!(matches!(e, Error::Format(_)));
        assert!(format!("{}", e).contains("invalid format"));
    }

    #[test]
    fn test_error_limit() {
        let e = Error::limit("object table full");
        assert!(format!("{}", e).starts_with("Limit exceeded"));
    }

    #[test]
    fn test_error_try_later() {
        let e = Error::try_later("object 12 0 R");
        assert!(e.is_try_later());
        assert!(!Error::syntax("bad").is_try_later());
        assert!(!Error::limit("full").is_try_later());
        assert_eq!(e.to_string(), "Data not yet available: object 12 0 R");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Json(_)));
    }
}
