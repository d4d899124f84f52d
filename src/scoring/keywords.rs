//! Keyword lists shared by the classifier and the message scorer. All
//! matching is done against lowercased text; entries are substrings, so
//! stems ("apolog") and phrase variants ("i understand" next to
//! "understand") are deliberate: layered phrasing accumulates matches.

pub(crate) const EMPATHY: &[&str] = &[
    "i understand",
    "understand",
    "your concern",
    "concern",
    "sorry",
    "apolog",
    "i hear you",
    "appreciate",
    "that must be",
    "i see why",
    "empath",
    "feel",
    "完全理解",
    "理解",
    "抱歉",
    "对不起",
    "体谅",
];

pub(crate) const SOLUTION: &[&str] = &[
    "let me",
    "i can",
    "i will",
    "we can",
    "we could",
    "offer",
    "option",
    "arrange",
    "provide",
    "recommend",
    "suggest",
    "alternative",
    "solution",
    "upgrade",
    "refund",
    "帮您",
    "安排",
    "建议",
    "方案",
];

pub(crate) const DOMAIN: &[&str] = &[
    "viking",
    "cruise",
    "cabin",
    "veranda",
    "stateroom",
    "suite",
    "excursion",
    "itinerary",
    "all-inclusive",
    "inclusion",
    "onboard",
    "on board",
    "shore",
    "deck",
    "mediterranean",
    "santorini",
    "维京",
    "游轮",
    "邮轮",
    "航线",
    "舱房",
    "行程",
];

pub(crate) const POLITE: &[&str] = &[
    "please",
    "thank you",
    "thanks",
    "appreciate",
    "kindly",
    "my pleasure",
    "请",
    "谢谢",
    "感谢",
];

pub(crate) const GREETING: &[&str] = &[
    "hello",
    "hi there",
    "good morning",
    "good afternoon",
    "good evening",
    "welcome",
    "have a great",
    "anything else",
    "glad to",
    "您好",
    "欢迎",
];

pub(crate) const SECOND_PERSON: &[&str] = &["you", "your", "您", "你"];

pub(crate) const CONNECTIVES: &[&str] = &[
    "first",
    "then",
    "also",
    "additionally",
    "moreover",
    "however",
    "because",
    "so that",
    "finally",
    "next",
    "首先",
    "其次",
    "另外",
    "因此",
    "然后",
];

/// Sentence-boundary characters, ASCII and fullwidth.
pub(crate) const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', '。', '！', '？'];

/// Number of list entries contained in the (already lowercased) text.
pub(crate) fn count_matches(lower: &str, list: &[&str]) -> u32 {
    list.iter().filter(|k| lower.contains(*k)).count() as u32
}

pub(crate) fn contains_any(lower: &str, list: &[&str]) -> bool {
    list.iter().any(|k| lower.contains(*k))
}
