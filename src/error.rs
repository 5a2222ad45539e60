//! Error types for pdfpick

use thiserror::Error;

/// Result type alias for pdfpick
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No pages were requested
    #[error("No pages selected")]
    EmptySelection,

    /// A requested page is not an integer in `1..=bound`
    #[error("Invalid page number: {value} (document has {bound} pages)")]
    InvalidPageNumber { value: String, bound: u32 },

    /// lopdf failed to load, copy or save a document
    #[error("PDF codec failure: {0}")]
    Codec(#[from] lopdf::Error),

    /// Nothing is stored under this key
    #[error("File not found: {key}")]
    NotFound { key: String },

    /// The request body could not be parsed
    #[error("Bad request: {reason}")]
    BadRequest { reason: String },

    /// The uploaded payload is missing or not a PDF
    #[error("Bad upload: {reason}")]
    BadUpload { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable identifier for the error kind, used in API error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EmptySelection => "empty_selection",
            Error::InvalidPageNumber { .. } => "invalid_page_number",
            Error::Codec(_) => "codec_failure",
            Error::NotFound { .. } => "not_found",
            Error::BadRequest { .. } => "bad_request",
            Error::BadUpload { .. } => "bad_upload",
            Error::Io(_) => "io",
        }
    }

    /// Return a sanitized error message safe to send to clients.
    /// Codec and I/O details are logged, not returned.
    pub fn client_message(&self) -> String {
        match self {
            Error::EmptySelection
            | Error::InvalidPageNumber { .. }
            | Error::BadRequest { .. }
            | Error::BadUpload { .. } => self.to_string(),
            Error::NotFound { .. } => "File not found".to_string(),
            Error::Codec(_) => "Could not process PDF".to_string(),
            Error::Io(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_page_message_names_value_and_bound() {
        let err = Error::InvalidPageNumber {
            value: "7".to_string(),
            bound: 3,
        };
        assert_eq!(err.kind(), "invalid_page_number");
        assert_eq!(
            err.client_message(),
            "Invalid page number: 7 (document has 3 pages)"
        );
    }

    #[test]
    fn test_io_message_is_sanitized() {
        let err = Error::Io(std::io::Error::other("/srv/temp/secret.pdf: disk full"));
        assert_eq!(err.kind(), "io");
        assert!(!err.client_message().contains("secret"));
    }

    #[test]
    fn test_bad_request_reason_reaches_client() {
        let err = Error::BadRequest {
            reason: "missing field `pages`".to_string(),
        };
        assert_eq!(err.kind(), "bad_request");
        assert_eq!(err.client_message(), "Bad request: missing field `pages`");
    }
}
