use std::sync::OnceLock;

use regex::Regex;

fn booking_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:book|reserve|reservation|table|schedule|party of)\b|\blets do\b|\bhow about\b")
            .expect("booking regex must compile")
    })
}

/// Heuristic: does the user's message read like a reservation request?
///
/// Matches whole words such as "book", "table" or "party of", plus the
/// follow-up phrasings "lets do 12pm" and "how about 7".
pub fn detect_booking_intent(query: &str) -> bool {
    booking_re().is_match(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_language_is_detected() {
        assert!(detect_booking_intent("Can we get a table for 4 at 7?"));
        assert!(detect_booking_intent("BOOK it"));
        assert!(detect_booking_intent("I'd like a reservation"));
        assert!(detect_booking_intent("party of 6 please"));
        assert!(detect_booking_intent("lets do 12pm"));
        assert!(detect_booking_intent("How about 7:30?"));
        assert!(detect_booking_intent("can you schedule that"));
    }

    #[test]
    fn ordinary_questions_are_not_bookings() {
        assert!(!detect_booking_intent("What's good for lunch?"));
        assert!(!detect_booking_intent("any vegetarian options"));
        assert!(!detect_booking_intent(""));
    }

    #[test]
    fn partial_words_do_not_match() {
        assert!(!detect_booking_intent("any good bookstores nearby?"));
        assert!(!detect_booking_intent("comfortable seating"));
        assert!(!detect_booking_intent("vegetables"));
    }
}
