//! Export, import and clear command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use quotebook_core::transfer::EXPORT_FILE_NAME;
use quotebook_core::QuoteBook;

use crate::output::Output;
use crate::prompt::confirm;

/// Write the collection to a JSON file
pub async fn export(book: &QuoteBook, path: Option<PathBuf>, output: &Output) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));

    let json = book
        .export_json()
        .await
        .context("Failed to serialize quotes")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;

    output.success(&format!(
        "Exported {} quote(s) to {}",
        book.len().await,
        path.display()
    ));
    Ok(())
}

/// Append quotes from a JSON file
pub async fn import(book: &QuoteBook, path: PathBuf, output: &Output) -> Result<()> {
    let raw =
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;

    let report = book
        .import_json(&raw)
        .await
        .with_context(|| format!("Failed to import {:?}", path))?;

    if output.is_json() {
        println!("{}", serde_json::json!({"status": "success", "import": report}));
    } else {
        output.success(&format!("Imported {} quote(s)", report.imported));
        if report.skipped > 0 {
            output.warn(&format!("Skipped {} invalid record(s)", report.skipped));
        }
    }
    Ok(())
}

/// Remove every quote and the saved copy
pub async fn clear(book: &QuoteBook, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() {
        println!("Delete all {} quote(s)?", book.len().await);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !book.clear().await {
        output.warn("Saved quotes could not be removed from storage");
    }

    output.success("Cleared all quotes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use quotebook_core::Config;
    use tempfile::TempDir;

    fn open_book(temp_dir: &TempDir) -> QuoteBook {
        QuoteBook::open_with_config(Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_export_then_import_into_other_book() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let output = Output::new(OutputFormat::Quiet);

        let source = open_book(&source_dir);
        source.add_quote("Exported", "Trip").await.unwrap();
        let file = source_dir.path().join("export.json");
        export(&source, Some(file.clone()), &output).await.unwrap();

        let target = open_book(&target_dir);
        clear(&target, true, &output).await.unwrap();
        import(&target, file, &output).await.unwrap();

        assert_eq!(target.quotes().await, source.quotes().await);
    }

    #[tokio::test]
    async fn test_import_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let book = open_book(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);

        let result = import(&book, temp_dir.path().join("nope.json"), &output).await;
        assert!(result.is_err());
        assert_eq!(book.len().await, 3);
    }

    #[tokio::test]
    async fn test_clear_without_prompt_in_quiet_mode() {
        let temp_dir = TempDir::new().unwrap();
        let book = open_book(&temp_dir);

        clear(&book, false, &Output::new(OutputFormat::Quiet))
            .await
            .unwrap();
        assert!(book.is_empty().await);
    }
}
