pub mod document;
pub mod extract;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{PdfDocument, PdfInfo};
pub use extract::{extract_page_numbers, extract_pages};
