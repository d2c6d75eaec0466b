//! Identifier inflection used for generated GraphQL names.
//!
//! Casing is delegated to `convert_case`; pluralisation follows the common
//! English rules an ORM applies to table and association names. Both are pure
//! and locale independent, so identical inputs always produce identical names.

use convert_case::{Case, Casing};

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "deer",
    "news",
    "metadata",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
];

/// Singular nouns ending in `-s` that would otherwise pass as plurals.
const SINGULAR_S: &[&str] = &["alias", "atlas", "bias", "canvas", "gas", "iris", "lens", "pancreas"];

/// Converts an identifier made of `_`-joined or mixed-case words to camelCase.
///
/// `create_User` becomes `createUser`, `new_User_todos_Edge` becomes
/// `newUserTodosEdge`.
pub fn camel_case(value: &str) -> String {
    value.to_case(Case::Camel)
}

/// Uppercases the first character, leaving the rest untouched.
pub fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the English plural of the last word of `word`, preserving its casing.
pub fn pluralize(word: &str) -> String {
    if !word.is_ascii() {
        return format!("{word}s");
    }
    let lower = word.to_ascii_lowercase();

    if UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }

    for (singular, plural) in IRREGULAR {
        if let Some((head, capitalised)) = trailing_word(word, &lower, singular) {
            return if capitalised {
                format!("{head}{}", upper_first(plural))
            } else {
                (*plural).to_string()
            };
        }
    }

    if SINGULAR_S
        .iter()
        .any(|singular| trailing_word(word, &lower, singular).is_some())
    {
        return format!("{word}es");
    }

    if lower.ends_with("ss")
        || lower.ends_with("sh")
        || lower.ends_with("ch")
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("us")
    {
        return format!("{word}es");
    }
    if lower.ends_with("is") {
        return format!("{}es", &word[..word.len() - 2]);
    }
    if lower.ends_with('s') {
        return word.to_string();
    }
    if lower.ends_with('y') && !ends_with_vowel_before(&lower, 1) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if lower.ends_with("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }

    format!("{word}s")
}

/// Splits off `suffix` when it is the whole trailing word of `word`:
/// `SalesPerson` matches `person`, `Fox` does not match `ox`. Returns the head
/// and whether the tail starts uppercase.
fn trailing_word<'a>(word: &'a str, lower: &str, suffix: &str) -> Option<(&'a str, bool)> {
    if !lower.ends_with(suffix) {
        return None;
    }
    let (head, tail) = word.split_at(word.len() - suffix.len());
    let capitalised = tail.starts_with(|c: char| c.is_ascii_uppercase());
    (head.is_empty() || capitalised).then_some((head, capitalised))
}

fn ends_with_vowel_before(lower: &str, suffix_len: usize) -> bool {
    lower
        .chars()
        .rev()
        .nth(suffix_len)
        .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("create_User"), "createUser");
        assert_eq!(camel_case("update_Users"), "updateUsers");
        assert_eq!(camel_case("Todo_assignees"), "todoAssignees");
        assert_eq!(camel_case("new_User_todos_Edge"), "newUserTodosEdge");
        assert_eq!(camel_case("deleted_User_id"), "deletedUserId");
        assert_eq!(camel_case("TodoAssignee"), "todoAssignee");
    }

    #[test]
    fn test_pluralize_regular() {
        assert_eq!(pluralize("User"), "Users");
        assert_eq!(pluralize("Todo"), "Todos");
        assert_eq!(pluralize("TodoAssignee"), "TodoAssignees");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Status"), "Statuses");
        assert_eq!(pluralize("Analysis"), "Analyses");
        assert_eq!(pluralize("Knife"), "Knives");
    }

    #[test]
    fn test_pluralize_irregular_and_uncountable() {
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("SalesPerson"), "SalesPeople");
        assert_eq!(pluralize("Child"), "Children");
        assert_eq!(pluralize("Sheep"), "Sheep");
        assert_eq!(pluralize("Information"), "Information");
        assert_eq!(pluralize("Woman"), "Women");
    }

    #[test]
    fn test_pluralize_already_plural() {
        assert_eq!(pluralize("Todos"), "Todos");
        assert_eq!(pluralize("assignees"), "assignees");
    }

    #[test]
    fn test_pluralize_singular_nouns_ending_in_s() {
        assert_eq!(pluralize("Canvas"), "Canvases");
        assert_eq!(pluralize("Gas"), "Gases");
        assert_eq!(pluralize("Atlas"), "Atlases");
        assert_eq!(pluralize("NaturalGas"), "NaturalGases");
        assert_eq!(pluralize("Iris"), "Irises");
        assert_eq!(pluralize("omegas"), "omegas");
    }

    #[test]
    fn test_upper_first() {
        assert_eq!(upper_first("id"), "Id");
        assert_eq!(upper_first(""), "");
        assert_eq!(upper_first("userId"), "UserId");
    }
}
