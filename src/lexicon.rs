//! Keyword tables behind the local mood rules.
//!
//! Matching is case-insensitive and whole-word: a keyword hits when it
//! appears in the text with no letter or digit directly on either side, so
//! "unhappy" never counts as "happy" while phrases such as "can't wait" still
//! match. There is no stemming and no negation handling; inflections that
//! matter are listed explicitly.

use crate::models::MoodCategory;

/// Declared evaluation order. The first category with a hit wins.
pub const PRIORITY: [MoodCategory; 6] = [
    MoodCategory::Happy,
    MoodCategory::Sad,
    MoodCategory::Angry,
    MoodCategory::Excited,
    MoodCategory::Calm,
    MoodCategory::Anxious,
];

const HAPPY: &[&str] = &[
    "happy",
    "glad",
    "joy",
    "joyful",
    "cheerful",
    "delighted",
    "great",
    "good",
    "wonderful",
    "grateful",
    "thankful",
    "blessed",
    "smiling",
];

const SAD: &[&str] = &[
    "sad",
    "down",
    "unhappy",
    "tired",
    "exhausted",
    "drained",
    "sleepy",
    "lonely",
    "alone",
    "isolated",
    "disappointed",
    "depressed",
    "miserable",
    "upset",
    "crying",
    "heartbroken",
    "hopeless",
    "let down",
];

const ANGRY: &[&str] = &[
    "angry",
    "mad",
    "furious",
    "annoyed",
    "frustrated",
    "irritated",
    "pissed",
    "rage",
    "hate",
    "resentful",
];

const EXCITED: &[&str] = &[
    "excited",
    "exciting",
    "thrilled",
    "pumped",
    "eager",
    "energized",
    "ecstatic",
    "hyped",
    "stoked",
    "can't wait",
];

const CALM: &[&str] = &[
    "calm",
    "peaceful",
    "relaxed",
    "serene",
    "content",
    "chill",
    "rested",
    "balanced",
    "tranquil",
];

const ANXIOUS: &[&str] = &[
    "anxious",
    "anxiety",
    "worried",
    "worry",
    "nervous",
    "stressed",
    "stress",
    "panic",
    "panicking",
    "overwhelmed",
    "afraid",
    "scared",
    "uneasy",
    "tense",
];

/// A named refinement inside one category, used to pick a more specific
/// message and tip list.
#[derive(Debug, Clone, Copy)]
pub struct SubKeywords {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

const HAPPY_VARIANTS: &[SubKeywords] = &[
    SubKeywords {
        name: "gratitude",
        keywords: &["grateful", "thankful", "blessed", "appreciate"],
    },
    SubKeywords {
        name: "connection",
        keywords: &["friend", "friends", "family", "partner", "together"],
    },
    SubKeywords {
        name: "achievement",
        keywords: &["promoted", "promotion", "passed", "won", "finished", "accomplished"],
    },
];

const SAD_VARIANTS: &[SubKeywords] = &[
    SubKeywords {
        name: "tired",
        keywords: &["tired", "exhausted", "drained", "sleepy", "fatigue", "fatigued", "worn out"],
    },
    SubKeywords {
        name: "lonely",
        keywords: &["lonely", "alone", "isolated", "nobody", "no one"],
    },
    SubKeywords {
        name: "disappointed",
        keywords: &["disappointed", "let down", "failed", "rejected"],
    },
];

const ANGRY_VARIANTS: &[SubKeywords] = &[
    SubKeywords {
        name: "work",
        keywords: &["work", "boss", "job", "coworker", "colleague", "meeting"],
    },
    SubKeywords {
        name: "relationship",
        keywords: &["partner", "friend", "family", "mom", "dad", "brother", "sister"],
    },
    SubKeywords {
        name: "unfair",
        keywords: &["unfair", "injustice", "ignored", "disrespected"],
    },
];

const EXCITED_VARIANTS: &[SubKeywords] = &[
    SubKeywords {
        name: "project",
        keywords: &["project", "idea", "build", "building", "launch", "starting", "new job"],
    },
    SubKeywords {
        name: "travel",
        keywords: &["trip", "travel", "traveling", "vacation", "holiday", "journey"],
    },
    SubKeywords {
        name: "event",
        keywords: &["party", "concert", "wedding", "birthday", "date"],
    },
];

const CALM_VARIANTS: &[SubKeywords] = &[
    SubKeywords {
        name: "mindful",
        keywords: &["meditate", "meditation", "meditating", "yoga", "breathing", "mindful"],
    },
    SubKeywords {
        name: "nature",
        keywords: &["nature", "walk", "park", "beach", "forest", "garden", "outside"],
    },
    SubKeywords {
        name: "rest",
        keywords: &["rested", "slept", "sleep", "nap", "weekend"],
    },
];

const ANXIOUS_VARIANTS: &[SubKeywords] = &[
    SubKeywords {
        name: "deadline",
        keywords: &["deadline", "deadlines", "exam", "exams", "test", "presentation", "interview", "work"],
    },
    SubKeywords {
        name: "future",
        keywords: &["future", "uncertain", "uncertainty", "unknown", "what if"],
    },
    SubKeywords {
        name: "sleepless",
        keywords: &["can't sleep", "insomnia", "awake", "restless"],
    },
];

pub fn keywords(category: MoodCategory) -> &'static [&'static str] {
    match category {
        MoodCategory::Happy => HAPPY,
        MoodCategory::Sad => SAD,
        MoodCategory::Angry => ANGRY,
        MoodCategory::Excited => EXCITED,
        MoodCategory::Calm => CALM,
        MoodCategory::Anxious => ANXIOUS,
    }
}

/// Sub-keyword refinements of a category, in evaluation order.
pub fn sub_keywords(category: MoodCategory) -> &'static [SubKeywords] {
    match category {
        MoodCategory::Happy => HAPPY_VARIANTS,
        MoodCategory::Sad => SAD_VARIANTS,
        MoodCategory::Angry => ANGRY_VARIANTS,
        MoodCategory::Excited => EXCITED_VARIANTS,
        MoodCategory::Calm => CALM_VARIANTS,
        MoodCategory::Anxious => ANXIOUS_VARIANTS,
    }
}

/// Lowercases and folds typographic apostrophes so "can’t" matches "can't".
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// `normalized` must already have gone through [`normalize`].
pub fn matches_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| contains_word(normalized, keyword))
}

/// For each category in priority order, whether any of its keywords occur.
pub fn lookup(text: &str) -> Vec<(MoodCategory, bool)> {
    let normalized = normalize(text);
    PRIORITY
        .iter()
        .map(|&category| (category, matches_any(&normalized, keywords(category))))
        .collect()
}

/// First sub-keyword group of `category` that occurs in the text.
pub fn refine(category: MoodCategory, text: &str) -> Option<&'static SubKeywords> {
    let normalized = normalize(text);
    sub_keywords(category)
        .iter()
        .find(|group| matches_any(&normalized, group.keywords))
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
