/// Keyword taxonomy — the ordered word tables the analyzer matches against.
///
/// Every table is evaluated first-match-wins in declaration order. The
/// tables overlap ("robot" is both a character and a sci-fi keyword), so
/// reordering entries changes classifications.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::outline::{Character, CharacterKind, Genre};

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),
}

/// Words that identify a character of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCategory {
    pub kind: CharacterKind,
    pub words: Vec<String>,
}

/// Keywords that put a logline into a genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRule {
    pub genre: Genre,
    pub keywords: Vec<String>,
}

/// The complete set of keyword tables.
///
/// Fields missing from a RON file keep their built-in values, so an
/// override file only needs the tables it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub characters: Vec<CharacterCategory>,
    /// Goal verbs, used as the story's action.
    pub goals: Vec<String>,
    pub settings: Vec<String>,
    pub places: Vec<String>,
    pub genres: Vec<GenreRule>,
    pub default_genre: Genre,
    pub default_character: String,
    pub default_action: String,
    pub default_setting: String,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            characters: vec![
                CharacterCategory {
                    kind: CharacterKind::Animal,
                    words: words(&[
                        "cat", "dog", "rabbit", "fox", "bear", "bird", "dragon", "unicorn",
                        "raccoon", "elephant",
                    ]),
                },
                CharacterCategory {
                    kind: CharacterKind::Person,
                    words: words(&[
                        "detective",
                        "teacher",
                        "chef",
                        "artist",
                        "scientist",
                        "musician",
                        "farmer",
                        "inventor",
                        "explorer",
                    ]),
                },
                CharacterCategory {
                    kind: CharacterKind::Fantasy,
                    words: words(&[
                        "wizard", "knight", "fairy", "elf", "dwarf", "princess", "monster",
                        "ghost", "vampire",
                    ]),
                },
                CharacterCategory {
                    kind: CharacterKind::Robot,
                    // "AI" is compared against lower-cased text and never matches.
                    words: words(&["robot", "android", "AI", "cyborg", "machine", "computer"]),
                },
                CharacterCategory {
                    kind: CharacterKind::Profession,
                    words: words(&[
                        "baker",
                        "librarian",
                        "doctor",
                        "pilot",
                        "sailor",
                        "gardener",
                        "photographer",
                    ]),
                },
            ],
            goals: words(&[
                "opens", "starts", "builds", "creates", "discovers", "finds", "learns", "teaches",
                "saves", "helps",
            ]),
            settings: words(&[
                "space",
                "underwater",
                "forest",
                "city",
                "village",
                "castle",
                "mountain",
                "desert",
                "future",
            ]),
            places: words(&[
                "bakery",
                "school",
                "library",
                "garden",
                "shop",
                "restaurant",
                "laboratory",
                "studio",
                "house",
            ]),
            genres: vec![
                GenreRule {
                    genre: Genre::SciFi,
                    keywords: words(&["space", "robot", "future"]),
                },
                GenreRule {
                    genre: Genre::Fantasy,
                    keywords: words(&["dragon", "magic", "wizard"]),
                },
                GenreRule {
                    genre: Genre::Mystery,
                    keywords: words(&["mystery", "detective", "solve"]),
                },
                GenreRule {
                    genre: Genre::Adventure,
                    keywords: words(&["adventure", "journey", "quest"]),
                },
            ],
            default_genre: Genre::SliceOfLife,
            default_character: "character".to_string(),
            default_action: "embarks on an adventure".to_string(),
            default_setting: "an interesting place".to_string(),
        }
    }
}

impl Taxonomy {
    /// Load a taxonomy from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Taxonomy, TaxonomyError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a taxonomy from a RON string.
    pub fn parse_ron(input: &str) -> Result<Taxonomy, TaxonomyError> {
        Ok(ron::from_str(input)?)
    }

    /// Render the taxonomy as pretty RON, suitable as a starting override file.
    pub fn to_ron(&self) -> Result<String, TaxonomyError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// First character word contained in `lower`, scanning categories in order.
    pub fn match_character(&self, lower: &str) -> Option<Character> {
        self.characters.iter().find_map(|category| {
            category
                .words
                .iter()
                .find(|word| lower.contains(word.as_str()))
                .map(|word| Character {
                    kind: category.kind,
                    name: word.clone(),
                })
        })
    }

    /// First goal verb contained in `lower`.
    pub fn match_goal(&self, lower: &str) -> Option<&str> {
        self.goals
            .iter()
            .find(|goal| lower.contains(goal.as_str()))
            .map(String::as_str)
    }

    /// Every setting, then every place, contained in `lower`.
    pub fn match_settings(&self, lower: &str) -> Vec<String> {
        self.settings
            .iter()
            .chain(self.places.iter())
            .filter(|word| lower.contains(word.as_str()))
            .cloned()
            .collect()
    }

    /// Genre of the first rule with a keyword contained in `lower`.
    pub fn match_genre(&self, lower: &str) -> Genre {
        self.genres
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map_or(self.default_genre, |rule| rule.genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_categories_in_order() {
        let taxonomy = Taxonomy::default();
        let kinds: Vec<CharacterKind> = taxonomy.characters.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CharacterKind::Animal,
                CharacterKind::Person,
                CharacterKind::Fantasy,
                CharacterKind::Robot,
                CharacterKind::Profession,
            ]
        );
    }

    #[test]
    fn earlier_category_wins() {
        let taxonomy = Taxonomy::default();
        // "wizard" (fantasy) and "cat" (animal) both present: animal is scanned first.
        let c = taxonomy
            .match_character("a wizard and a cat walk into a bar")
            .unwrap();
        assert_eq!(c.kind, CharacterKind::Animal);
        assert_eq!(c.name, "cat");
    }

    #[test]
    fn substring_matching() {
        let taxonomy = Taxonomy::default();
        // "scattered" contains "cat".
        let c = taxonomy.match_character("scattered leaves").unwrap();
        assert_eq!(c.name, "cat");
    }

    #[test]
    fn uppercase_keyword_never_matches_lowered_text() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.match_character("an ai wakes up").is_none());
    }

    #[test]
    fn goal_list_order() {
        let taxonomy = Taxonomy::default();
        // "starts" comes before "learns" in the goal list.
        assert_eq!(taxonomy.match_goal("learns then starts"), Some("starts"));
        assert_eq!(taxonomy.match_goal("sleeps all day"), None);
    }

    #[test]
    fn settings_before_places() {
        let taxonomy = Taxonomy::default();
        let found = taxonomy.match_settings("a bakery in the city near the forest");
        assert_eq!(found, vec!["forest", "city", "bakery"]);
    }

    #[test]
    fn genre_rule_order() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.match_genre("a robot dragon"), Genre::SciFi);
        assert_eq!(taxonomy.match_genre("a dragon quest"), Genre::Fantasy);
        assert_eq!(taxonomy.match_genre("a detective on a journey"), Genre::Mystery);
        assert_eq!(taxonomy.match_genre("a long journey"), Genre::Adventure);
        assert_eq!(taxonomy.match_genre("tea with grandma"), Genre::SliceOfLife);
    }

    #[test]
    fn partial_ron_override_keeps_defaults() {
        let ron = r#"(
            goals: ["sings"],
            default_action: "hums quietly",
        )"#;
        let taxonomy = Taxonomy::parse_ron(ron).unwrap();
        assert_eq!(taxonomy.goals, vec!["sings".to_string()]);
        assert_eq!(taxonomy.default_action, "hums quietly");
        assert_eq!(taxonomy.characters.len(), 5);
        assert_eq!(taxonomy.default_setting, "an interesting place");
    }

    #[test]
    fn load_fixture_taxonomy() {
        let path = std::path::PathBuf::from("tests/fixtures/taxonomy.ron");
        let taxonomy = Taxonomy::load_from_ron(&path).unwrap();
        assert_eq!(taxonomy.characters.len(), 2);
        assert_eq!(taxonomy.characters[0].kind, CharacterKind::Fantasy);
        assert_eq!(taxonomy.default_genre, Genre::Adventure);
    }
}
