//! Quote command handlers

use anyhow::Result;

use quotebook_core::{CategoryFilter, QuoteBook};

use crate::output::Output;

/// Show a random quote
pub async fn show(book: &QuoteBook, category: Option<String>, output: &Output) -> Result<()> {
    let filter = category.as_deref().map(CategoryFilter::parse);

    match book.show_quote(filter.as_ref()).await {
        Some(quote) => output.print_quote(&quote),
        None => {
            let filter = filter.unwrap_or_else(|| book.selected_category());
            output.message(&format!("No quotes available in category '{}'.", filter));
        }
    }

    Ok(())
}

/// Add a quote and forward it to the remote when sync is enabled
pub async fn add(book: &QuoteBook, text: String, category: String, output: &Output) -> Result<()> {
    let quote = book.add_quote(&text, &category).await?;

    output.success(&format!("Added quote to {}", quote.category));
    output.print_quote(&quote);

    if book.config().sync_enabled {
        crate::commands::sync::push(book, &quote, output).await;
    }

    Ok(())
}

/// List quotes, optionally filtered by category
pub async fn list(book: &QuoteBook, category: Option<String>, output: &Output) -> Result<()> {
    let filter = match category {
        Some(ref c) => CategoryFilter::parse(c),
        None => CategoryFilter::All,
    };

    let quotes = book.filtered(&filter).await;
    output.print_quotes(&quotes);
    Ok(())
}

/// List the category menu
pub async fn categories(book: &QuoteBook, output: &Output) -> Result<()> {
    let categories = book.categories().await;
    let selected = book.selected_category();

    output.print_categories(&categories, selected.as_str());
    Ok(())
}

/// Show or change the selected category
pub async fn category(book: &QuoteBook, name: Option<String>, output: &Output) -> Result<()> {
    let Some(name) = name else {
        return categories(book, output).await;
    };

    let filter = CategoryFilter::parse(&name);
    let quotes = book.select_category(filter.clone()).await;

    output.success(&format!("Selected category: {}", filter));
    output.print_quotes(&quotes);
    Ok(())
}
