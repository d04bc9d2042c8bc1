//! Naming helpers shared by every generator.
//!
//! Case conversion goes through `convert_case`; pluralization is a small
//! deterministic rule set with an irregular-noun table. All generators derive
//! table names, routes, field names and file names from these functions so the
//! server and client trees agree on every identifier.

use convert_case::{Case, Casing};
use regex::Regex;
use std::sync::OnceLock;

/// Irregular English plurals, matched on the last word of a compound name
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("child", "children"),
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
];

/// Nouns whose plural equals the singular
const UNCOUNTABLE: &[&str] = &["data", "information", "equipment", "news", "series", "species"];

/// Keywords of Java and Dart that cannot be used as field or variable names
const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "async", "await", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "default", "do", "double", "else", "enum", "extends", "false",
    "final", "finally", "float", "for", "goto", "if", "implements", "import", "in", "instanceof",
    "int", "interface", "is", "long", "native", "new", "null", "package", "private", "protected",
    "public", "return", "short", "static", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "var", "void", "volatile", "while", "with", "yield",
];

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static regex is valid"))
}

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Convert a string to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

/// Convert a string to camelCase
pub fn to_camel_case(s: &str) -> String {
    s.to_case(Case::Camel)
}

/// Convert a string to kebab-case
pub fn to_kebab_case(s: &str) -> String {
    s.to_case(Case::Kebab)
}

/// Convert an identifier to a human-readable label (`publishedAt` -> `Published At`)
pub fn to_title_case(s: &str) -> String {
    s.to_case(Case::Title)
}

/// Upper-case the first character, leaving the rest untouched (`publishedAt` -> `PublishedAt`)
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character, leaving the rest untouched (`OrderItem` -> `orderItem`)
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pluralize an English noun.
///
/// PascalCase compounds only pluralize their last word (`OrderItem` -> `OrderItems`,
/// `GrandChild` -> `GrandChildren`). The leading letter's case is preserved.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let split = word
        .char_indices()
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0);
    let (head, tail) = word.split_at(split);

    format!("{}{}", head, pluralize_word(tail))
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(singular, _)| *singular == lower) {
        return match_leading_case(word, plural);
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", word);
    }

    if lower.ends_with('y') {
        let before_y = lower.chars().rev().nth(1);
        if matches!(before_y, Some(c) if !"aeiou".contains(c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }

    format!("{}s", word)
}

fn match_leading_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

/// Whether `name` can be used verbatim as a Java and Dart class name
pub fn is_valid_class_name(name: &str) -> bool {
    identifier_regex().is_match(name)
}

/// Whether `name` is a Java or Dart keyword
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Replace accented Latin letters with their ASCII base letter (`dirección` -> `direccion`).
/// Other characters are kept as they are.
pub fn fold_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
            'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// camelCase a name and make it safe to use as a field or variable name
pub fn to_field_name(s: &str) -> String {
    let camel = to_camel_case(s);
    if is_reserved_word(&camel) {
        format!("{}Value", camel)
    } else {
        camel
    }
}

/// Escape a string for a double-quoted Java literal
pub fn escape_java_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Escape a string for a single-quoted Dart literal
pub fn escape_dart_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('$', "\\$")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
