//! Device name search criteria

use std::fmt;

/// Ordered list of substrings a device name must all contain.
///
/// Matching is case-sensitive and ignores order; the order is kept for
/// diagnostics. An empty list matches every device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    keywords: Vec<String>,
}

impl SearchCriteria {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.keywords.iter().all(|w| name.contains(w.as_str()))
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.keywords)
    }
}
