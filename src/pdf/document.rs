use chrono::{DateTime, FixedOffset, NaiveDate};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

use crate::error::Result;

/// A loaded source document.
pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Metadata from the trailer's `/Info` dictionary. Entries that are
    /// missing, empty or not strings are left as `None`.
    pub fn get_info(&self) -> PdfInfo {
        let dict = self.info_dictionary();
        let text = |key: &[u8]| dict.and_then(|dict| self.text_entry(dict, key));
        let date = |key: &[u8]| text(key).as_deref().and_then(parse_pdf_date);

        PdfInfo {
            title: text(b"Title"),
            author: text(b"Author"),
            subject: text(b"Subject"),
            keywords: text(b"Keywords"),
            creator: text(b"Creator"),
            producer: text(b"Producer"),
            creation_date: date(b"CreationDate"),
            mod_date: date(b"ModDate"),
            version: self.doc.version.clone(),
            page_count: self.page_count(),
        }
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn text_entry(&self, dict: &Dictionary, key: &[u8]) -> Option<String> {
        let value = match dict.get(key).ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?,
            direct => direct,
        };
        match value {
            Object::String(bytes, _) => Some(decode_text(bytes)).filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Serialize a document to bytes
    pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        doc.compress();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        let bytes = Self::to_bytes(doc)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub mod_date: Option<DateTime<FixedOffset>>,
    pub version: String,
    pub page_count: u32,
}

/// Decode a PDF text string: UTF-16 or UTF-8 when a byte order mark says so,
/// PDFDocEncoding (read as Latin-1) otherwise.
fn decode_text(bytes: &[u8]) -> String {
    let utf16 = |rest: &[u8], unit: fn([u8; 2]) -> u16| {
        let units: Vec<u16> = rest.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
        String::from_utf16_lossy(&units)
    };
    match bytes {
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        latin1 => latin1.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`). Everything after the year
/// is optional; a missing zone means UTC.
fn parse_pdf_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    let text = text.strip_prefix("D:").unwrap_or(text);
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, zone) = text.split_at(split);
    if !(4..=14).contains(&digits.len()) || digits.len() % 2 != 0 {
        return None;
    }

    let field = |at: usize, default: u32| match digits.get(at..at + 2) {
        Some(two) => two.parse().ok(),
        None => Some(default),
    };
    let year: i32 = digits[..4].parse().ok()?;
    let local = NaiveDate::from_ymd_opt(year, field(4, 1)?, field(6, 1)?)?.and_hms_opt(
        field(8, 0)?,
        field(10, 0)?,
        field(12, 0)?,
    )?;
    local.and_local_timezone(parse_zone(zone)?).single()
}

fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let (sign, rest) = match zone.chars().next() {
        None | Some('Z') => return FixedOffset::east_opt(0),
        Some('+') => (1, &zone[1..]),
        Some('-') => (-1, &zone[1..]),
        Some(_) => return None,
    };
    let mut parts = rest.split('\'').filter(|part| !part.is_empty());
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = match parts.next() {
        Some(minutes) => minutes.parse().ok()?,
        None => 0,
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::sample_pdf;
    use lopdf::{dictionary, StringFormat};

    #[test]
    fn test_from_bytes_counts_pages() {
        let doc = PdfDocument::from_bytes(&sample_pdf(4)).unwrap();
        assert_eq!(doc.page_count(), 4);
        let numbers: Vec<u32> = doc.page_ids().into_iter().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = PdfDocument::from_bytes(b"definitely not a pdf").err().unwrap();
        assert_eq!(err.kind(), "codec_failure");
    }

    #[test]
    fn test_open_missing_file() {
        let err = PdfDocument::open("/nonexistent/nope.pdf").err().unwrap();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_info_reads_utf16_title() {
        let mut doc = PdfDocument::from_bytes(&sample_pdf(1)).unwrap();
        let mut title = vec![0xFE, 0xFF];
        for unit in "Résumé".encode_utf16() {
            title.extend_from_slice(&unit.to_be_bytes());
        }
        let info_id = doc.doc.add_object(dictionary! {
            "Title" => Object::String(title, StringFormat::Hexadecimal),
            "Author" => Object::string_literal("Ada"),
        });
        doc.doc.trailer.set("Info", info_id);

        let info = doc.get_info();
        assert_eq!(info.title.as_deref(), Some("Résumé"));
        assert_eq!(info.author.as_deref(), Some("Ada"));
        assert_eq!(info.creator, None);
        assert_eq!(info.page_count, 1);
    }

    #[test]
    fn test_info_reads_subject_keywords_and_dates() {
        let mut doc = PdfDocument::from_bytes(&sample_pdf(1)).unwrap();
        let keywords_id = doc.doc.add_object(Object::string_literal("pdf, pages"));
        doc.doc.trailer.set(
            "Info",
            dictionary! {
                "Subject" => Object::string_literal("Quarterly report"),
                "Keywords" => keywords_id,
                "Creator" => Object::string_literal(""),
                "CreationDate" => Object::string_literal("D:20240305143000+01'00'"),
                "ModDate" => Object::string_literal("not a date"),
            },
        );

        let info = doc.get_info();
        assert_eq!(info.subject.as_deref(), Some("Quarterly report"));
        assert_eq!(info.keywords.as_deref(), Some("pdf, pages"));
        assert_eq!(info.creator, None);
        assert_eq!(
            info.creation_date.unwrap().to_rfc3339(),
            "2024-03-05T14:30:00+01:00"
        );
        assert_eq!(info.mod_date, None);
    }

    #[test]
    fn test_info_without_dictionary() {
        let info = PdfDocument::from_bytes(&sample_pdf(2)).unwrap().get_info();
        assert_eq!(info.title, None);
        assert_eq!(info.creation_date, None);
        assert_eq!(info.page_count, 2);
    }

    #[test]
    fn test_decode_text_encodings() {
        assert_eq!(decode_text(b"caf\xe9"), "café");
        assert_eq!(decode_text(b"\xef\xbb\xbfna\xc3\xafve"), "naïve");
        assert_eq!(decode_text(&[0xFF, 0xFE, b'o', 0, b'k', 0]), "ok");
        assert_eq!(decode_text(b""), "");
    }

    #[test]
    fn test_parse_pdf_dates() {
        let rfc = |text: &str| parse_pdf_date(text).map(|d| d.to_rfc3339());
        assert_eq!(rfc("D:2023"), Some("2023-01-01T00:00:00+00:00".into()));
        assert_eq!(rfc("D:20231231235959Z"), Some("2023-12-31T23:59:59+00:00".into()));
        assert_eq!(rfc("20230615"), Some("2023-06-15T00:00:00+00:00".into()));
        assert_eq!(rfc("D:199812231952-08'00'"), Some("1998-12-23T19:52:00-08:00".into()));
        assert_eq!(rfc("D:20230230"), None);
        assert_eq!(rfc("D:20231"), None);
        assert_eq!(rfc("D:2023+1x"), None);
    }

    #[test]
    fn test_save_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut doc = PdfDocument::from_bytes(&sample_pdf(2)).unwrap().doc;
        PdfDocument::save(&mut doc, &path).unwrap();
        assert_eq!(PdfDocument::open(&path).unwrap().page_count(), 2);
    }
}
