use serde::{Deserialize, Serialize};

use super::keywords;

/// Coarse quality bucket for one agent utterance. Drives canned-reply
/// selection when the gateway is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyQuality {
    Confused,
    Weak,
    Good,
}

/// Exact filler utterances that read as "no real answer".
const FILLER_TOKENS: &[&str] = &[
    "ok",
    "k",
    "?",
    "idk",
    "dont know",
    "don't know",
    "不知道",
    "嗯",
];

const INTERROGATIVE_STARTERS: &[&str] = &["what", "huh", "idk", "什么"];

/// Minimal empathic/helpful markers that rescue a short reply from `Weak`.
const BASIC_HELPFUL: &[&str] = &["sorry", "understand", "help", "抱歉", "理解", "帮"];

/// Classify one agent utterance. Pure and total: every string, including the
/// empty string, maps to exactly one bucket. Rules apply in priority order,
/// first match wins. Lengths are character counts, not bytes.
pub fn classify(text: &str) -> ReplyQuality {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    let len = trimmed.chars().count();

    if len < 10
        || FILLER_TOKENS.contains(&lower.as_str())
        || INTERROGATIVE_STARTERS.iter().any(|s| lower.starts_with(s))
    {
        return ReplyQuality::Confused;
    }

    if len < 30 && !keywords::contains_any(&lower, BASIC_HELPFUL) {
        return ReplyQuality::Weak;
    }

    if len > 50
        || keywords::contains_any(&lower, keywords::EMPATHY)
        || keywords::contains_any(&lower, keywords::SOLUTION)
    {
        return ReplyQuality::Good;
    }

    ReplyQuality::Weak
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short_inputs_are_confused() {
        assert_eq!(classify(""), ReplyQuality::Confused);
        assert_eq!(classify("ok"), ReplyQuality::Confused);
        assert_eq!(classify("?"), ReplyQuality::Confused);
        assert_eq!(classify("idk"), ReplyQuality::Confused);
        assert_eq!(classify("嗯"), ReplyQuality::Confused);
    }

    #[test]
    fn test_interrogative_starter_is_confused() {
        assert_eq!(classify("what do you even mean by that"), ReplyQuality::Confused);
        assert_eq!(classify("huh, that makes no sense to me"), ReplyQuality::Confused);
    }

    #[test]
    fn test_short_without_helpful_keyword_is_weak() {
        assert_eq!(classify("the price is fixed"), ReplyQuality::Weak);
    }

    #[test]
    fn test_short_with_helpful_keyword_is_good() {
        // 10-29 chars containing "sorry" skips the weak rule and lands on
        // the keyword rule.
        assert_eq!(classify("sorry about that sir"), ReplyQuality::Good);
    }

    #[test]
    fn test_long_text_is_good() {
        let text = "The fare covers shore excursions, dining, and gratuities on every itinerary.";
        assert_eq!(classify(text), ReplyQuality::Good);
    }

    #[test]
    fn test_scenario_a_sentence_is_good() {
        let text = "I understand your concern — let me show you the concrete value breakdown \
                    and offer a complimentary upgrade option.";
        assert_eq!(classify(text), ReplyQuality::Good);
    }

    #[test]
    fn test_deterministic() {
        let inputs = ["", "ok", "some medium length reply here", "what?"];
        for input in inputs {
            assert_eq!(classify(input), classify(input));
        }
    }

    #[test]
    fn test_default_bucket_is_weak() {
        // 30-50 chars, no keyword match anywhere.
        let text = "the brochure lists all of it in detail";
        assert_eq!(classify(text), ReplyQuality::Weak);
    }
}
