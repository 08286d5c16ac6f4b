//! Segments a free-text AI reply into restaurant suggestions.
//!
//! Replies arrive either already structured (bullets, numbering,
//! `Name: description` lines) or as conversational prose. Both shapes are
//! handled heuristically; anything that does not yield at least two
//! suggestions degrades to plain paragraph text.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{SegmentationResult, SuggestionItem, MIN_LIST_ITEMS};

const BULLET_MARKER: &str = r"^([0-9]+[).\-]|[-*•])\s+";

fn bullet_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BULLET_MARKER).expect("bullet regex must compile"))
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z][A-Za-z0-9'’&().,\- ]+:\s+").expect("label regex must compile")
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex must compile"))
}

// One punctuation byte, whitespace, one capital byte. The split point sits
// after the punctuation and before the capital.
fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+[A-Z]").expect("sentence regex must compile"))
}

fn lead_in_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:here (?:are|is)|top|based on)\b").expect("lead-in regex must compile")
    })
}

fn name_verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^((?:The|A|An)\s+)?",
            r"([A-Z][A-Za-z0-9_'’&().,\-]*(?:\s+[A-Z][A-Za-z0-9_'’&().,\-]*){0,6})",
            r"\s+(?:is|offers|serves|specializes|specialises|known|features|has|delivers|provides)\b",
        ))
        .expect("name-verb regex must compile")
    })
}

fn dash_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[–—-]\s+").expect("dash regex must compile"))
}

fn body_lead_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-–—:]\s*").expect("body lead regex must compile"))
}

/// True for numbered/bulleted lines and `Label: text` lines.
pub fn is_bullet_line(line: &str) -> bool {
    bullet_marker_re().is_match(line) || label_re().is_match(line)
}

/// Drops a leading bullet or number marker. `Label:` text is left alone.
pub fn clean_bullet_prefix(line: &str) -> &str {
    match bullet_marker_re().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Splits prose on `.`, `!` or `?` followed by whitespace and a capital
/// letter. Abbreviations like "St. Louis" split too.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let collapsed = whitespace_re().replace_all(text, " ");
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_break_re().find_iter(&collapsed) {
        push_trimmed(&mut sentences, &collapsed[start..m.start() + 1]);
        start = m.end() - 1;
    }
    push_trimmed(&mut sentences, &collapsed[start..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, segment: &str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        out.push(segment.to_string());
    }
}

pub fn parse_restaurant_suggestions(text: &str) -> SegmentationResult {
    let raw = text.trim();
    if raw.is_empty() {
        return SegmentationResult::default();
    }

    let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.iter().any(|l| is_bullet_line(l)) {
        return parse_list_lines(&lines);
    }

    parse_prose(raw)
}

fn parse_list_lines(lines: &[&str]) -> SegmentationResult {
    let mut items: Vec<SuggestionItem> = Vec::new();
    let mut current: Option<usize> = None;

    for line in lines {
        if is_bullet_line(line) {
            let cleaned = clean_bullet_prefix(line);
            let item = match cleaned.split_once(':') {
                Some((title, body)) if title.trim().encode_utf16().count() > 1 => {
                    SuggestionItem::new(title.trim(), body.trim())
                }
                _ => SuggestionItem::new("", cleaned.trim()),
            };
            items.push(item);
            current = Some(items.len() - 1);
        } else if let Some(idx) = current {
            let item = &mut items[idx];
            item.body = format!("{} {}", item.body, line).trim().to_string();
        }
    }

    items.retain(|i| !i.is_empty());
    SegmentationResult { intro: None, items }
}

fn parse_prose(raw: &str) -> SegmentationResult {
    let sentences = split_into_sentences(raw);
    if sentences.len() <= 1 {
        return SegmentationResult::default();
    }

    let mut intro_candidates: Vec<&str> = Vec::new();
    let mut items: Vec<SuggestionItem> = Vec::new();

    for sentence in &sentences {
        let s = sentence.trim();
        if s.is_empty() {
            continue;
        }

        if lead_in_re().is_match(s) {
            intro_candidates.push(s);
            continue;
        }

        if let Some(item) = name_verb_item(s).or_else(|| dash_item(s)) {
            items.push(item);
            continue;
        }

        if items.is_empty() {
            intro_candidates.push(s);
        } else {
            items.push(SuggestionItem::new("", s));
        }
    }

    let intro = if intro_candidates.is_empty() {
        None
    } else {
        Some(intro_candidates.join(" ").trim().to_string())
    };

    if items.len() >= MIN_LIST_ITEMS {
        SegmentationResult { intro, items }
    } else {
        SegmentationResult {
            intro,
            items: Vec::new(),
        }
    }
}

fn name_verb_item(sentence: &str) -> Option<SuggestionItem> {
    let caps = name_verb_re().captures(sentence)?;
    let name_end = caps.get(2)?.end();
    let title = sentence[..name_end].trim();
    let rest = sentence[name_end..].trim();
    let body = body_lead_re().replace(rest, "");
    Some(SuggestionItem::new(title, body.into_owned()))
}

fn dash_item(sentence: &str) -> Option<SuggestionItem> {
    let parts: Vec<&str> = dash_separator_re().split(sentence).collect();
    if parts.len() < 2 {
        return None;
    }
    let title = parts[0].trim();
    if !title.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let body = parts[1..].join(" — ");
    Some(SuggestionItem::new(title, body.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_bullet_and_label_lines() {
        assert!(is_bullet_line("1) Luigi's: great pasta"));
        assert!(is_bullet_line("2. Sunset Grill"));
        assert!(is_bullet_line("10- Taqueria"));
        assert!(is_bullet_line("- cozy spot"));
        assert!(is_bullet_line("* cozy spot"));
        assert!(is_bullet_line("• cozy spot"));
        assert!(is_bullet_line("Joe's Pizza & Grill (Downtown): slices"));
        assert!(!is_bullet_line("1)no space"));
        assert!(!is_bullet_line("lowercase label: nope"));
        assert!(!is_bullet_line("Label:no space"));
        assert!(!is_bullet_line("Just a sentence."));
    }

    #[test]
    fn clean_prefix_keeps_label_text() {
        assert_eq!(clean_bullet_prefix("1) Luigi's: great pasta"), "Luigi's: great pasta");
        assert_eq!(clean_bullet_prefix("•   Sunset Grill"), "Sunset Grill");
        assert_eq!(clean_bullet_prefix("Luigi's: great pasta"), "Luigi's: great pasta");
    }

    #[test]
    fn splits_sentences_on_capitalized_breaks() {
        let sentences = split_into_sentences("Hungry?  Try Luigi's.\nIt is open!  Enjoy it. ok then.");
        assert_eq!(
            sentences,
            vec!["Hungry?", "Try Luigi's.", "It is open!", "Enjoy it. ok then."]
        );
    }

    #[test]
    fn abbreviations_false_split() {
        let sentences = split_into_sentences("Head to St. Louis Bistro tonight.");
        assert_eq!(sentences, vec!["Head to St.", "Louis Bistro tonight."]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(parse_restaurant_suggestions(""), SegmentationResult::default());
        assert_eq!(parse_restaurant_suggestions(" \n\t "), SegmentationResult::default());
        assert!(split_into_sentences("   ").is_empty());
    }

    #[test]
    fn numbered_labels_become_titled_items() {
        let result =
            parse_restaurant_suggestions("1) Luigi's: great pasta\n2) Sunset Grill: rooftop views");
        assert_eq!(result.intro, None);
        assert_eq!(
            result.items,
            vec![
                SuggestionItem::new("Luigi's", "great pasta"),
                SuggestionItem::new("Sunset Grill", "rooftop views"),
            ]
        );
        assert!(result.has_list());
    }

    #[test]
    fn list_path_joins_continuations_and_drops_orphans() {
        let text = "some preamble nobody asked for\n\
                    - Luigi's: great pasta\n\
                    \x20 open until midnight\n\
                    - Sunset Grill: views: and cocktails\n\
                    - just go somewhere";
        let result = parse_restaurant_suggestions(text);
        assert_eq!(
            result.items,
            vec![
                SuggestionItem::new("Luigi's", "great pasta open until midnight"),
                SuggestionItem::new("Sunset Grill", "views: and cocktails"),
                SuggestionItem::new("", "just go somewhere"),
            ]
        );
    }

    #[test]
    fn single_letter_label_is_not_a_title() {
        let result = parse_restaurant_suggestions("1. A: the best\n2. Bo's: fine");
        assert_eq!(result.items[0], SuggestionItem::new("", "A: the best"));
        assert_eq!(result.items[1], SuggestionItem::new("Bo's", "fine"));
    }

    #[test]
    fn bare_colon_stays_in_body() {
        let result = parse_restaurant_suggestions("- :\n- Luigi's: pasta");
        assert_eq!(
            result.items,
            vec![
                SuggestionItem::new("", ":"),
                SuggestionItem::new("Luigi's", "pasta"),
            ]
        );
    }

    #[test]
    fn title_length_counts_utf16_units() {
        let result = parse_restaurant_suggestions("- 😀: emoji spot\n- é: accent spot");
        assert_eq!(
            result.items,
            vec![
                SuggestionItem::new("😀", "emoji spot"),
                SuggestionItem::new("", "é: accent spot"),
            ]
        );
    }

    #[test]
    fn here_is_lead_in_becomes_intro() {
        let result = parse_restaurant_suggestions(
            "Here is what I found. Luigi's offers pasta. Sunset Grill serves steaks.",
        );
        assert_eq!(result.intro.as_deref(), Some("Here is what I found."));
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn top_lead_in_becomes_intro() {
        let result = parse_restaurant_suggestions(
            "TOP choices near you tonight. Luigi's offers pasta. Sunset Grill serves steaks.",
        );
        assert_eq!(result.intro.as_deref(), Some("TOP choices near you tonight."));
        assert_eq!(result.items[0].title, "Luigi's");
        assert_eq!(result.items[1].title, "Sunset Grill");
    }

    #[test]
    fn plain_sentence_before_any_item_joins_intro() {
        let result = parse_restaurant_suggestions(
            "Here are some ideas. I checked what is open now. Luigi's offers pasta. Sunset Grill serves steaks.",
        );
        assert_eq!(
            result.intro.as_deref(),
            Some("Here are some ideas. I checked what is open now.")
        );
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn prose_with_intro_and_named_items() {
        let result = parse_restaurant_suggestions(
            "Here are two picks. Luigi's offers classic Italian fare. Sunset Grill serves rooftop dining.",
        );
        assert_eq!(result.intro.as_deref(), Some("Here are two picks."));
        assert_eq!(
            result.items,
            vec![
                SuggestionItem::new("Luigi's", "offers classic Italian fare."),
                SuggestionItem::new("Sunset Grill", "serves rooftop dining."),
            ]
        );
    }

    #[test]
    fn prose_keeps_leading_article_in_title() {
        let result = parse_restaurant_suggestions(
            "Based on your location, two spots stand out. The Golden Spoon is a diner. A Taste Of Rome has pasta.",
        );
        assert_eq!(
            result.intro.as_deref(),
            Some("Based on your location, two spots stand out.")
        );
        assert_eq!(result.items[0].title, "The Golden Spoon");
        assert_eq!(result.items[0].body, "is a diner.");
        assert_eq!(result.items[1].title, "A Taste Of Rome");
    }

    #[test]
    fn prose_dash_fallback_and_continuations() {
        let result = parse_restaurant_suggestions(
            "Two options tonight. Luigi's - cozy Italian spot. Sunset Grill — rooftop views – cocktails. Both fill up fast.",
        );
        assert_eq!(result.intro.as_deref(), Some("Two options tonight."));
        assert_eq!(
            result.items,
            vec![
                SuggestionItem::new("Luigi's", "cozy Italian spot."),
                SuggestionItem::new("Sunset Grill", "rooftop views — cocktails."),
                SuggestionItem::new("", "Both fill up fast."),
            ]
        );
    }

    #[test]
    fn prose_with_one_item_collapses_to_intro() {
        let result =
            parse_restaurant_suggestions("I found a spot for you. Luigi's offers handmade pasta.");
        assert_eq!(result.intro.as_deref(), Some("I found a spot for you."));
        assert!(result.items.is_empty());
        assert!(!result.has_list());
    }

    #[test]
    fn single_sentence_is_unstructured() {
        let result = parse_restaurant_suggestions("Luigi's offers handmade pasta.");
        assert_eq!(result, SegmentationResult::default());
    }

    #[test]
    fn reparsing_fields_does_not_restructure() {
        let first = parse_restaurant_suggestions(
            "Here are two picks. Luigi's offers classic Italian fare. Sunset Grill serves rooftop dining.",
        );
        for item in &first.items {
            assert_eq!(parse_restaurant_suggestions(&item.body), SegmentationResult::default());
            assert_eq!(parse_restaurant_suggestions(&item.title), SegmentationResult::default());
        }
    }
}
