//! Read-only queries over a quote collection
//!
//! Category listing and filtered random selection. These work on plain
//! slices so they can run against a locked `QuoteStore` or any snapshot.

use rand::Rng;

use crate::models::{CategoryFilter, Quote, ALL_CATEGORIES};

/// A quote chosen by [`pick_random`], with its position in the full collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub index: usize,
    pub quote: Quote,
}

/// List categories for a filter menu
///
/// `"all"` comes first, followed by each distinct category in the order
/// it first appears.
pub fn list_categories(quotes: &[Quote]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for quote in quotes {
        if !categories.iter().any(|c| *c == quote.category) {
            categories.push(quote.category.clone());
        }
    }
    categories
}

/// Quotes matching a filter, in collection order
pub fn filter<'a>(quotes: &'a [Quote], filter: &CategoryFilter) -> Vec<&'a Quote> {
    quotes.iter().filter(|q| q.matches(filter)).collect()
}

/// Pick a random quote matching the filter
///
/// Returns `None` when nothing matches. Repeats are allowed.
pub fn pick_random(quotes: &[Quote], filter: &CategoryFilter) -> Option<Pick> {
    pick_random_with(&mut rand::thread_rng(), quotes, filter)
}

/// Same as [`pick_random`] with a caller-supplied generator
pub fn pick_random_with<R: Rng + ?Sized>(
    rng: &mut R,
    quotes: &[Quote],
    filter: &CategoryFilter,
) -> Option<Pick> {
    let candidates: Vec<usize> = quotes
        .iter()
        .enumerate()
        .filter(|(_, q)| q.matches(filter))
        .map(|(i, _)| i)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let index = candidates[rng.gen_range(0..candidates.len())];
    Some(Pick {
        index,
        quote: quotes[index].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn q(text: &str, category: &str) -> Quote {
        Quote::new(text, category).unwrap()
    }

    #[test]
    fn test_list_categories_first_seen_order() {
        let quotes = vec![q("a", "X"), q("b", "Y"), q("c", "X")];
        assert_eq!(list_categories(&quotes), vec!["all", "X", "Y"]);
    }

    #[test]
    fn test_list_categories_empty_collection() {
        assert_eq!(list_categories(&[]), vec!["all"]);
    }

    #[test]
    fn test_list_categories_does_not_duplicate_literal_all() {
        let quotes = vec![q("a", "all"), q("b", "Y")];
        assert_eq!(list_categories(&quotes), vec!["all", "Y"]);
    }

    #[test]
    fn test_filter_by_category() {
        let quotes = vec![q("a", "X"), q("b", "Y"), q("c", "X")];
        let xs = filter(&quotes, &CategoryFilter::parse("X"));
        let texts: Vec<_> = xs.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert_eq!(filter(&quotes, &CategoryFilter::All).len(), 3);
    }

    #[test]
    fn test_pick_random_empty_is_none() {
        assert!(pick_random(&[], &CategoryFilter::All).is_none());
    }

    #[test]
    fn test_pick_random_single_element() {
        let quotes = vec![q("only", "X")];
        for _ in 0..20 {
            let pick = pick_random(&quotes, &CategoryFilter::All).unwrap();
            assert_eq!(pick.index, 0);
            assert_eq!(pick.quote, quotes[0]);
        }
    }

    #[test]
    fn test_pick_random_no_match_is_none() {
        let quotes = vec![q("a", "X")];
        assert!(pick_random(&quotes, &CategoryFilter::parse("Y")).is_none());
    }

    #[test]
    fn test_pick_random_respects_filter() {
        let quotes = vec![q("a", "X"), q("b", "Y"), q("c", "X"), q("d", "Z")];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let pick = pick_random_with(&mut rng, &quotes, &CategoryFilter::parse("X")).unwrap();
            assert_eq!(pick.quote.category, "X");
            assert_eq!(quotes[pick.index], pick.quote);
        }
    }

    #[test]
    fn test_pick_random_reaches_every_candidate() {
        let quotes = vec![q("a", "X"), q("b", "X"), q("c", "X")];
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<usize> = (0..200)
            .filter_map(|_| pick_random_with(&mut rng, &quotes, &CategoryFilter::All))
            .map(|p| p.index)
            .collect();
        assert_eq!(seen.len(), 3);
    }
}
