//! Joins suggestion titles back to the structured businesses of a turn.

use std::collections::HashMap;
use std::sync::OnceLock;

use clutch_common::ai_chat::BusinessEntity;
use regex::Regex;

use crate::model::{LinkedSuggestion, SuggestionItem};

fn non_alnum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("non-alnum regex must compile"))
}

/// Lowercases, drops apostrophes, and reduces every other run of
/// non-alphanumerics to one space.
pub fn normalize_name(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '’'))
        .collect();
    let spaced = non_alnum_re().replace_all(&lowered, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attaches a business URL to each titled item whose normalized title
/// equals a business's normalized name.
///
/// Businesses that normalize to the same name collide; the later one wins.
pub fn link_suggestions_to_businesses(
    items: &[SuggestionItem],
    businesses: &[BusinessEntity],
) -> Vec<LinkedSuggestion> {
    let by_name: HashMap<String, &BusinessEntity> = businesses
        .iter()
        .filter(|b| !b.name.is_empty() && !b.url.is_empty())
        .map(|b| (normalize_name(&b.name), b))
        .collect();

    items
        .iter()
        .map(|item| {
            let business_url = if item.title.is_empty() {
                None
            } else {
                by_name
                    .get(&normalize_name(&item.title))
                    .map(|b| b.url.clone())
            };
            LinkedSuggestion {
                title: item.title.clone(),
                body: item.body.clone(),
                business_url,
            }
        })
        .collect()
}
