use anyhow::{Context, Result};
use pdfpick::pdf::PdfDocument;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let doc = PdfDocument::open(path)
        .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
    let info = doc.get_info();

    println!("File: {}", path.display());
    println!("PDF version: {}", info.version);
    println!("Pages: {}", info.page_count);

    let fields = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Keywords", &info.keywords),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }

    let dates = [("Created", info.creation_date), ("Modified", info.mod_date)];
    for (label, date) in dates {
        if let Some(date) = date {
            println!("{}: {}", label, date.format("%Y-%m-%d %H:%M:%S %:z"));
        }
    }

    Ok(())
}
