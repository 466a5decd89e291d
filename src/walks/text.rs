//! Text walks over datatype literals
//!
//! Each `(predicate, literal)` fact of an entity becomes one or more walks
//! `entity predicate token...`, chunked so that no walk is longer than the
//! requested token budget.

use crate::store::TripleSource;
use regex::Regex;
use std::sync::LazyLock;

/// Shortest meaningful text walk: entity, predicate and one token
pub const MIN_TEXT_WALK_LENGTH: usize = 3;

/// Language tag followed by a dotted suffix, e.g. `"@en.x`
static LANG_DOTTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""@.{2}.*\..*$"#).expect("Invalid language tag regex"));

/// Plain two-letter language tag at the end, e.g. `"@en`
static LANG_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""@[A-Za-z]{2}$"#).expect("Invalid language tag regex"));

/// Datatype annotation, e.g. `"^^<http://www.w3.org/2001/XMLSchema#int>`
static DATATYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\^\^.*\..*$"#).expect("Invalid datatype regex"));

/// Everything that is not a letter, digit or space
static NON_ALPHANUMERIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9 ÄäÜüÖöß]").expect("Invalid character class regex")
});

/// Normalize a literal for text walks
///
/// Strips language and datatype annotations, removes every character that
/// is not alphanumeric or a space, trims and lowercases.
pub fn normalize_text(literal: &str) -> String {
    let text = LANG_DOTTED_REGEX.replace(literal, "");
    let text = LANG_TAG_REGEX.replace(&text, "");
    let text = DATATYPE_REGEX.replace(&text, "");
    let text = NON_ALPHANUMERIC_REGEX.replace_all(&text, "");
    text.trim().to_lowercase()
}

/// Generate text walks for `entity`
///
/// `max_length` is the token budget per walk including entity and
/// predicate; values below [`MIN_TEXT_WALK_LENGTH`] are raised to it.
/// Chunks never span two literals.
pub fn text_walks<S>(source: &S, entity: &str, max_length: usize) -> Vec<String>
where
    S: TripleSource + ?Sized,
{
    let max_length = max_length.max(MIN_TEXT_WALK_LENGTH);
    let mut result = Vec::new();

    for (predicate, literal) in source.datatype_facts(entity) {
        let normalized = normalize_text(literal);
        let mut chunk: Vec<&str> = Vec::with_capacity(max_length);

        for token in normalized.split_whitespace() {
            if chunk.is_empty() {
                chunk.push(entity);
                chunk.push(predicate);
            }
            chunk.push(token);
            if chunk.len() == max_length {
                result.push(chunk.join(" "));
                chunk.clear();
            }
        }

        if !chunk.is_empty() {
            result.push(chunk.join(" "));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TripleStore;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("\"Hello World\"@en"), "hello world");
        assert_eq!(
            normalize_text("\"42\"^^<http://www.w3.org/2001/XMLSchema#int>"),
            "42"
        );
        assert_eq!(normalize_text("  Foo-Bar, baz!  "), "foobar baz");
        assert_eq!(normalize_text("Größe"), "größe");
        assert_eq!(normalize_text("?!"), "");
    }

    #[test]
    fn test_text_walks_chunking() {
        let mut store = TripleStore::new();
        store.insert_datatype("E", "comment", "one two three four five");

        // budget 4 leaves room for two tokens per walk
        let walks = text_walks(&store, "E", 4);
        assert_eq!(
            walks,
            vec![
                "E comment one two",
                "E comment three four",
                "E comment five",
            ]
        );
        for walk in &walks {
            assert!(walk.split(' ').count() <= 4);
        }
    }

    #[test]
    fn test_text_walks_do_not_span_literals() {
        let mut store = TripleStore::new();
        store.insert_datatype("E", "label", "alpha");
        store.insert_datatype("E", "label", "beta");

        let mut walks = text_walks(&store, "E", 10);
        walks.sort();
        assert_eq!(walks, vec!["E label alpha", "E label beta"]);
    }

    #[test]
    fn test_text_walks_budget_is_clamped() {
        let mut store = TripleStore::new();
        store.insert_datatype("E", "label", "a b");
        let walks = text_walks(&store, "E", 1);
        assert_eq!(walks, vec!["E label a", "E label b"]);
    }

    #[test]
    fn test_text_walks_without_facts() {
        let mut store = TripleStore::new();
        store.insert("E", "p", "F");
        store.insert_datatype("E", "label", "!!!");
        assert!(text_walks(&store, "E", 6).is_empty());
        assert!(text_walks(&store, "F", 6).is_empty());
    }
}
