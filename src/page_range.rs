//! Command-line page selections such as `1-5,10,15-end` or `9-6`.

use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Page(u32),
    End,
}

impl Bound {
    fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("end") {
            return Ok(Bound::End);
        }
        s.parse::<u32>()
            .map(Bound::Page)
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }

    fn resolve(self, total_pages: u32) -> Result<u32> {
        let page = match self {
            Bound::Page(n) => n,
            Bound::End => total_pages,
        };
        if page == 0 {
            bail!("Page numbers must be >= 1");
        }
        if page > total_pages {
            bail!("Page {} exceeds total pages {}", page, total_pages);
        }
        Ok(page)
    }
}

/// One comma-separated item: a single page or an inclusive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: Bound,
    pub last: Bound,
}

impl PageRange {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Empty page range");
        }

        match s.split_once('-') {
            // "-5" is not a range
            Some(("", _)) => bail!("Invalid page range: {}", s),
            Some((first, last)) => Ok(PageRange {
                first: Bound::parse(first)?,
                last: Bound::parse(last)?,
            }),
            None => {
                let page = Bound::parse(s)?;
                Ok(PageRange {
                    first: page,
                    last: page,
                })
            }
        }
    }

    /// Expand into 1-based page numbers; descending runs count down.
    pub fn expand(&self, total_pages: u32) -> Result<Vec<u32>> {
        let first = self.first.resolve(total_pages)?;
        let last = self.last.resolve(total_pages)?;

        Ok(if first <= last {
            (first..=last).collect()
        } else {
            (last..=first).rev().collect()
        })
    }
}

/// Expand a page range string into an ordered list of 1-based page numbers.
/// Repeated pages are kept.
pub fn expand_page_ranges(s: &str, total_pages: u32) -> Result<Vec<u32>> {
    let mut pages = Vec::new();
    for part in s.split(',') {
        pages.extend(PageRange::parse(part)?.expand(total_pages)?);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page() {
        let range = PageRange::parse("5").unwrap();
        assert_eq!(range.first, Bound::Page(5));
        assert_eq!(range.expand(10).unwrap(), vec![5]);
    }

    #[test]
    fn test_page_range() {
        let range = PageRange::parse("1-5").unwrap();
        assert_eq!(range.expand(10).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_reverse_range() {
        let range = PageRange::parse("5-1").unwrap();
        assert_eq!(range.expand(10).unwrap(), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_end_keyword() {
        assert_eq!(expand_page_ranges("8-end", 10).unwrap(), vec![8, 9, 10]);
        assert_eq!(expand_page_ranges("END", 4).unwrap(), vec![4]);
    }

    #[test]
    fn test_order_and_duplicates_kept() {
        let pages = expand_page_ranges("3,1,3, 2-1", 3).unwrap();
        assert_eq!(pages, vec![3, 1, 3, 2, 1]);
    }

    #[test]
    fn test_invalid_page_zero() {
        let range = PageRange::parse("0").unwrap();
        assert!(range.expand(10).is_err());
    }

    #[test]
    fn test_page_exceeds_total() {
        assert!(expand_page_ranges("1,15", 10).is_err());
    }

    #[test]
    fn test_malformed() {
        for bad in ["", "-5", "1,,2", "a-3", "2-x"] {
            assert!(expand_page_ranges(bad, 10).is_err(), "{bad:?} should fail");
        }
    }
}
