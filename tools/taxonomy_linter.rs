/// Taxonomy Linter — checks keyword tables for entries that can never match.
///
/// Usage: taxonomy_linter [<taxonomy.ron>] [--print-default]
///
/// Without a file the built-in taxonomy is linted.

use clap::Parser;
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::process;
use story_lab::core::taxonomy::Taxonomy;

#[derive(Parser)]
#[clap(author, version, about = "Lint a Story Lab keyword taxonomy")]
struct Cli {
    /// Taxonomy RON file; the built-in tables when omitted
    taxonomy: Option<PathBuf>,
    /// Print the built-in taxonomy as RON and exit
    #[clap(long)]
    print_default: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.print_default {
        match Taxonomy::default().to_ron() {
            Ok(ron) => println!("{}", ron),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let taxonomy = match &cli.taxonomy {
        Some(path) => match Taxonomy::load_from_ron(path) {
            Ok(t) => {
                println!("Loaded: {}", path.display());
                t
            }
            Err(e) => {
                eprintln!("ERROR: Failed to load taxonomy file: {}", e);
                process::exit(1);
            }
        },
        None => {
            println!("Linting built-in taxonomy");
            Taxonomy::default()
        }
    };

    let (errors, warnings) = lint_taxonomy(&taxonomy);

    println!("\n=== Taxonomy Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

/// A named keyword list, in evaluation order.
struct Table<'a> {
    name: String,
    words: &'a [String],
}

fn lint_taxonomy(taxonomy: &Taxonomy) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let character_tables: Vec<Table> = taxonomy
        .characters
        .iter()
        .map(|c| Table {
            name: format!("characters/{}", c.kind.name()),
            words: &c.words,
        })
        .collect();
    let genre_tables: Vec<Table> = taxonomy
        .genres
        .iter()
        .map(|r| Table {
            name: format!("genres/{}", r.genre.name()),
            words: &r.keywords,
        })
        .collect();
    let flat_tables = [
        Table {
            name: "goals".to_string(),
            words: &taxonomy.goals,
        },
        Table {
            name: "settings".to_string(),
            words: &taxonomy.settings,
        },
        Table {
            name: "places".to_string(),
            words: &taxonomy.places,
        },
    ];

    let all_tables = character_tables
        .iter()
        .chain(genre_tables.iter())
        .chain(flat_tables.iter());

    for table in all_tables {
        if table.words.is_empty() {
            errors.push(format!("{} is empty", table.name));
        }

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for word in table.words {
            if word.trim().is_empty() {
                errors.push(format!("{} contains a blank keyword", table.name));
            } else if word.chars().any(char::is_uppercase) {
                warnings.push(format!(
                    "{}: '{}' has uppercase letters and never matches lower-cased text",
                    table.name, word
                ));
            }
            if !seen.insert(word.as_str()) {
                warnings.push(format!("{}: duplicate keyword '{}'", table.name, word));
            }
        }
    }

    // First-match tables: a keyword containing an earlier keyword is unreachable.
    warnings.extend(shadowed(&character_tables));
    warnings.extend(shadowed(&genre_tables));
    warnings.extend(shadowed(&flat_tables[..1]));

    (errors, warnings)
}

/// Keywords that can never be the first match because an earlier keyword
/// in scan order is a substring of them. Within one genre rule every
/// keyword selects the same genre, so only earlier rules shadow.
fn shadowed(tables: &[Table]) -> Vec<String> {
    let mut warnings = Vec::new();
    let per_rule = tables.iter().all(|t| t.name.starts_with("genres/"));

    for (ti, table) in tables.iter().enumerate() {
        for (wi, word) in table.words.iter().enumerate() {
            let earlier = tables[..ti]
                .iter()
                .flat_map(|t| t.words.iter().map(move |w| (t, w)))
                .chain(
                    table.words[..wi]
                        .iter()
                        .filter(|_| !per_rule)
                        .map(|w| (table, w)),
                );
            for (owner, candidate) in earlier {
                if candidate != word && !candidate.is_empty() && word.contains(candidate.as_str()) {
                    warnings.push(format!(
                        "{}: '{}' is shadowed by '{}' in {}",
                        table.name, word, candidate, owner.name
                    ));
                    break;
                }
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_taxonomy_only_flags_uppercase_ai() {
        let (errors, warnings) = lint_taxonomy(&Taxonomy::default());
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'AI'"));
    }

    #[test]
    fn reports_empty_duplicate_and_shadowed() {
        let taxonomy = Taxonomy::parse_ron(
            r#"(
                characters: [
                    (kind: animal, words: ["cat", "cat", "wildcat"]),
                    (kind: robot, words: []),
                ],
                goals: ["find", "finds"],
            )"#,
        )
        .unwrap();
        let (errors, warnings) = lint_taxonomy(&taxonomy);
        assert_eq!(errors, vec!["characters/robot is empty".to_string()]);
        assert!(warnings.iter().any(|w| w.contains("duplicate keyword 'cat'")));
        assert!(warnings
            .iter()
            .any(|w| w.contains("'wildcat' is shadowed by 'cat'")));
        assert!(warnings
            .iter()
            .any(|w| w.contains("goals: 'finds' is shadowed by 'find'")));
    }
}
