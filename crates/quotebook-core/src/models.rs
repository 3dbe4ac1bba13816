//! Data models for Quotebook
//!
//! Defines the core data structures: `Quote` and `CategoryFilter`.
//! A quote has no identifier of its own; two quotes are the same entry
//! when their `text` matches exactly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel category meaning "no filter"
pub const ALL_CATEGORIES: &str = "all";

/// Category assigned to every quote that came from the remote endpoint
pub const SERVER_CATEGORY: &str = "Server";

/// Reasons a quote can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Quote text was empty after trimming
    #[error("Quote text must not be empty")]
    EmptyText,

    /// Category was empty after trimming
    #[error("Quote category must not be empty")]
    EmptyCategory,
}

/// A single quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Quote {
    /// The quote itself
    pub text: String,
    /// Free-form category label
    pub category: String,
}

impl Quote {
    /// Create a validated quote
    ///
    /// Both fields are trimmed. Fails if either is empty afterwards.
    pub fn new(text: impl AsRef<str>, category: impl AsRef<str>) -> Result<Self, ValidationError> {
        let text = text.as_ref().trim();
        let category = category.as_ref().trim();

        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }

        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Check the quote invariant on an already constructed value
    ///
    /// Used for records that arrive through deserialization, which
    /// bypasses `Quote::new`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Whether this quote belongs to the given filter
    pub fn matches(&self, filter: &CategoryFilter) -> bool {
        match filter {
            CategoryFilter::All => true,
            CategoryFilter::Category(name) => self.category == *name,
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.text, self.category)
    }
}

/// The built-in quotes used when nothing has been saved yet
pub fn seed_quotes() -> Vec<Quote> {
    [
        (
            "The best way to predict the future is to invent it.",
            "Inspiration",
        ),
        ("Do or do not. There is no try.", "Motivation"),
        ("Simplicity is the soul of efficiency.", "Wisdom"),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// Which quotes a query should consider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every quote
    #[default]
    All,
    /// Only quotes with exactly this category
    Category(String),
}

impl CategoryFilter {
    /// Parse a filter from its stored form
    ///
    /// `"all"` and blank input both mean no filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(value.to_string())
        }
    }

    /// The stored form of this filter
    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Category(name) => name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Option<&str>> for CategoryFilter {
    fn from(value: Option<&str>) -> Self {
        value.map(CategoryFilter::parse).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let quote = Quote::new("  Stay hungry.  ", "\tLife \n").unwrap();
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.category, "Life");
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        assert_eq!(Quote::new("", "x"), Err(ValidationError::EmptyText));
        assert_eq!(Quote::new("   ", "x"), Err(ValidationError::EmptyText));
        assert_eq!(Quote::new("x", ""), Err(ValidationError::EmptyCategory));
        assert_eq!(Quote::new("x", " \t"), Err(ValidationError::EmptyCategory));
    }

    #[test]
    fn test_validate_deserialized_quote() {
        let quote: Quote = serde_json::from_str(r#"{"text":" ","category":"A"}"#).unwrap();
        assert_eq!(quote.validate(), Err(ValidationError::EmptyText));

        let quote: Quote = serde_json::from_str(r#"{"text":"ok","category":"A"}"#).unwrap();
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn test_seed_quotes_are_valid() {
        let seed = seed_quotes();
        assert_eq!(seed.len(), 3);
        assert!(seed.iter().all(|q| q.validate().is_ok()));
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("  "), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(" Wisdom "),
            CategoryFilter::Category("Wisdom".to_string())
        );
        // Case-sensitive: only the exact sentinel means "no filter"
        assert_eq!(
            CategoryFilter::parse("All"),
            CategoryFilter::Category("All".to_string())
        );
    }

    #[test]
    fn test_category_filter_display() {
        assert_eq!(CategoryFilter::All.to_string(), "all");
        assert_eq!(
            CategoryFilter::Category("Wisdom".to_string()).to_string(),
            "Wisdom"
        );
    }

    #[test]
    fn test_matches() {
        let quote = Quote::new("text", "Wisdom").unwrap();
        assert!(quote.matches(&CategoryFilter::All));
        assert!(quote.matches(&CategoryFilter::parse("Wisdom")));
        assert!(!quote.matches(&CategoryFilter::parse("wisdom")));
    }
}
