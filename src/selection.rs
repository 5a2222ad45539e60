use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// One requested page, as the caller sent it.
///
/// Browsers post checkbox values as either numbers or strings, so both are
/// accepted on the wire. Anything that does not resolve to an integer in
/// `1..=bound` is rejected by [`PageEntry::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageEntry(Value);

impl PageEntry {
    /// Validate this entry against a document with `bound` pages and return
    /// the 1-based page number.
    pub fn resolve(&self, bound: u32) -> Result<u32> {
        let number = match &self.0 {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        match number {
            Some(n) if n >= 1 && n <= i64::from(bound) => Ok(n as u32),
            _ => Err(Error::InvalidPageNumber {
                value: self.display_value(),
                bound,
            }),
        }
    }

    fn display_value(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<u32> for PageEntry {
    fn from(page: u32) -> Self {
        PageEntry(Value::from(page))
    }
}

impl From<&str> for PageEntry {
    fn from(page: &str) -> Self {
        PageEntry(Value::from(page))
    }
}
