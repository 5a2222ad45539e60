//! pdfpick: build a new PDF from a chosen, ordered subset of another PDF's
//! pages.
//!
//! - [`pdf::extract_pages`]: the extraction operation
//! - [`storage::Storage`]: flat directory store for uploads and results
//! - [`api::app`]: HTTP routes for upload, retrieval and extraction

pub mod api;
pub mod config;
pub mod error;
pub mod page_range;
pub mod pdf;
pub mod selection;
pub mod storage;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use selection::PageEntry;
