//! Status command handler

use std::collections::HashSet;

use anyhow::Result;

use quotebook_core::{CategoryFilter, Origin, QuoteBook};

use crate::output::{Output, OutputFormat};

/// What `status` reports about the collection and its saved copy
struct StatusReport {
    quotes: usize,
    categories: usize,
    selected: CategoryFilter,
    loaded_from: &'static str,
    saved: bool,
    storage_error: Option<String>,
    suggestion: Option<&'static str>,
}

async fn gather(book: &QuoteBook) -> StatusReport {
    let quotes = book.quotes().await;
    let categories = quotes
        .iter()
        .map(|q| q.category.as_str())
        .collect::<HashSet<_>>()
        .len();

    let (saved, storage_error, suggestion) = match book.persistence().try_load() {
        Ok(loaded) => (loaded.is_some(), None, None),
        Err(e) => (
            book.persistence().has_saved_quotes(),
            Some(e.to_string()),
            e.recovery_suggestion(),
        ),
    };

    StatusReport {
        quotes: quotes.len(),
        categories,
        selected: book.selected_category(),
        loaded_from: match book.origin() {
            Origin::Seed => "seed",
            Origin::Saved => "saved",
        },
        saved,
        storage_error,
        suggestion,
    }
}

/// Show status information
pub async fn show(book: &QuoteBook, output: &Output) -> Result<()> {
    let config = book.config();
    let report = gather(book).await;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "quotes": report.quotes,
                    "categories": report.categories,
                    "selected_category": report.selected.as_str(),
                    "loaded_from": report.loaded_from,
                    "storage": {
                        "data_dir": config.data_dir,
                        "saved": report.saved,
                        "error": report.storage_error,
                        "suggestion": report.suggestion
                    },
                    "sync": {
                        "enabled": config.sync_enabled,
                        "remote_url": config.effective_remote_url(),
                        "push_url": config.effective_push_url(),
                        "interval_secs": config.sync_interval().as_secs()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", report.quotes);
            if let Some(error) = &report.storage_error {
                eprintln!("Warning: {}", error);
            }
        }
        OutputFormat::Human => {
            println!("Quotebook Status");
            println!("================");
            println!();
            println!("Contents:");
            println!("  Quotes:     {}", report.quotes);
            println!("  Categories: {}", report.categories);
            println!("  Selected:   {}", report.selected);
            println!("  Loaded:     {}", report.loaded_from);
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Saved:    {}", if report.saved { "yes" } else { "no" });
            if let Some(error) = &report.storage_error {
                println!("  Problem:  {}", error);
            }
            if let Some(suggestion) = report.suggestion {
                println!("  Fix:      {}", suggestion);
            }
            println!();
            println!("Sync:");
            println!(
                "  Status:   {}",
                if config.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("  Server:   {}", config.effective_remote_url());
            println!("  Interval: {}s", config.sync_interval().as_secs());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotebook_core::Config;
    use tempfile::TempDir;

    fn open_book(temp_dir: &TempDir) -> QuoteBook {
        QuoteBook::open_with_config(Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_unparsable_saved_copy_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("quotes.json"), "{not json").unwrap();

        let book = open_book(&temp_dir);
        let report = gather(&book).await;

        assert_eq!(report.loaded_from, "seed");
        assert!(report.saved);
        assert!(report.storage_error.unwrap().contains("corrupt"));
        assert!(report.suggestion.unwrap().contains("quotes.json"));
    }

    #[tokio::test]
    async fn test_healthy_saved_copy() {
        let temp_dir = TempDir::new().unwrap();
        let book = open_book(&temp_dir);
        book.add_quote("Kept", "Life").await.unwrap();

        let report = gather(&book).await;
        assert!(report.saved);
        assert!(report.storage_error.is_none());
        assert!(report.suggestion.is_none());
    }

    #[tokio::test]
    async fn test_category_named_all_is_counted() {
        let temp_dir = TempDir::new().unwrap();
        let book = open_book(&temp_dir);
        book.clear().await;
        book.add_quote("First", "all").await.unwrap();
        book.add_quote("Second", "Life").await.unwrap();
        book.add_quote("Third", "Life").await.unwrap();

        let report = gather(&book).await;
        assert_eq!(report.quotes, 3);
        assert_eq!(report.categories, 2);
    }

    #[tokio::test]
    async fn test_empty_collection_has_no_categories() {
        let temp_dir = TempDir::new().unwrap();
        let book = open_book(&temp_dir);
        book.clear().await;

        let report = gather(&book).await;
        assert_eq!(report.categories, 0);
        assert!(!report.saved);
    }
}
