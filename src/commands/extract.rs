use anyhow::{Context, Result};
use pdfpick::page_range::expand_page_ranges;
use pdfpick::pdf::{extract_page_numbers, PdfDocument};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let doc = PdfDocument::open(input)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;
    let page_list = expand_page_ranges(pages, doc.page_count())?;

    let mut new_doc = extract_page_numbers(&doc, &page_list)?;
    PdfDocument::save(&mut new_doc, output)
        .with_context(|| format!("Failed to save PDF: {}", output.display()))?;

    println!(
        "Extracted {} page(s) to {}",
        page_list.len(),
        output.display()
    );

    Ok(())
}
