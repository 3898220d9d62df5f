/// Logline analysis — character, action, setting, genre and complexity.
use crate::core::taxonomy::Taxonomy;
use crate::schema::outline::{Analysis, Character, CharacterKind, Complexity};

/// Analyze a logline against the given taxonomy.
///
/// Never fails: every extractor has a fallback.
pub fn analyze(logline: &str, taxonomy: &Taxonomy) -> Analysis {
    let lower = logline.to_lowercase();
    let words: Vec<&str> = lower.split(is_space).filter(|w| !w.is_empty()).collect();

    Analysis {
        character: extract_character(&lower, &words, taxonomy),
        action: taxonomy
            .match_goal(&lower)
            .unwrap_or(taxonomy.default_action.as_str())
            .to_string(),
        setting: extract_setting(&lower, taxonomy),
        genre: taxonomy.match_genre(&lower),
        complexity: complexity(logline),
        keywords: words
            .iter()
            .filter(|w| w.chars().count() > 3)
            .map(|w| w.to_string())
            .collect(),
    }
}

fn extract_character(lower: &str, words: &[&str], taxonomy: &Taxonomy) -> Character {
    if let Some(character) = taxonomy.match_character(lower) {
        return character;
    }

    // Default to the first noun-like word.
    let name = words
        .iter()
        .find(|w| w.chars().count() > 2)
        .map_or_else(|| taxonomy.default_character.clone(), |w| w.to_string());
    Character {
        kind: CharacterKind::Person,
        name,
    }
}

fn extract_setting(lower: &str, taxonomy: &Taxonomy) -> Vec<String> {
    let settings = taxonomy.match_settings(lower);
    if settings.is_empty() {
        vec![taxonomy.default_setting.clone()]
    } else {
        settings
    }
}

/// Whitespace as loglines are split and trimmed: Unicode whitespace minus
/// U+0085, plus the byte-order mark U+FEFF.
pub fn is_space(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Trim [`is_space`] characters from both ends.
pub fn trim_space(text: &str) -> &str {
    text.trim_matches(is_space)
}

pub fn is_blank(text: &str) -> bool {
    text.chars().all(is_space)
}

/// Number of words as counted by a split on whitespace runs.
///
/// Leading and trailing whitespace each add an empty word, so `" a b "`
/// counts as four.
pub fn word_count(text: &str) -> usize {
    let mut count = 1;
    let mut in_gap = false;
    for c in text.chars() {
        if is_space(c) {
            if !in_gap {
                count += 1;
                in_gap = true;
            }
        } else {
            in_gap = false;
        }
    }
    count
}

/// Classify how much story a logline carries.
pub fn complexity(logline: &str) -> Complexity {
    let length = logline.chars().count();
    let words = word_count(logline);

    if words <= 5 || length <= 30 {
        Complexity::Simple
    } else if words <= 10 || length <= 60 {
        Complexity::Medium
    } else {
        Complexity::Complex
    }
}
