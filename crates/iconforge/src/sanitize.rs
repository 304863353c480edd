//! Identifier sanitizing for generated Dart sources.
//!
//! Icon names come from file names, so they can contain anything. Every name
//! has to end up as a lower-case Dart identifier matching `[a-z_][a-z0-9_]*`
//! that is not a reserved word.
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Used when nothing usable is left of a name.
pub const PLACEHOLDER: &str = "icon";
/// Prefix for names that do not start with a letter.
pub const LEADING_MARKER: &str = "icon_";
/// Appended to names colliding with a reserved word.
pub const RESERVED_SUFFIX: &str = "_icon";

// Dart reserved words, built-in identifiers and contextual keywords.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "as", "assert", "async", "await", "base", "break", "case", "catch", "class",
        "const", "continue", "covariant", "default", "deferred", "do", "dynamic", "else", "enum",
        "export", "extends", "extension", "external", "factory", "false", "final", "finally",
        "for", "function", "get", "hide", "if", "implements", "import", "in", "interface", "is",
        "late", "library", "mixin", "new", "null", "of", "on", "operator", "part", "required",
        "rethrow", "return", "sealed", "set", "show", "static", "super", "switch", "sync", "this",
        "throw", "true", "try", "type", "typedef", "var", "void", "when", "with", "while", "yield",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

/// Lower-case, underscore delimited form of `name`.
///
/// `HomeIcon`, `home-icon` and `Home Icon` all become `home_icon`. Characters
/// outside `[a-z0-9_]` are dropped, runs of underscores collapse and leading or
/// trailing underscores are trimmed. The result may be empty.
pub fn canonicalize(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len());
    let mut prev: Option<char> = None;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                spaced.push('_');
            }
            spaced.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || matches!(ch, '-' | '.' | '+') {
            spaced.push('_');
        } else {
            spaced.push(ch);
        }
        prev = Some(ch);
    }

    let mut out = String::with_capacity(spaced.len());
    for ch in spaced.chars() {
        match ch {
            'a'..='z' | '0'..='9' => out.push(ch),
            '_' if !out.is_empty() && !out.ends_with('_') => out.push('_'),
            _ => {}
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Maps an arbitrary glyph name to a valid, non-reserved Dart identifier.
///
/// Total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(name: &str) -> String {
    let mut ident = canonicalize(name);
    if ident.is_empty() {
        ident.push_str(PLACEHOLDER);
    }
    if !ident.starts_with(|c: char| c.is_ascii_lowercase() || c == '_') {
        ident.insert_str(0, LEADING_MARKER);
    }
    if is_reserved(&ident) {
        ident.push_str(RESERVED_SUFFIX);
    }
    ident
}

/// File stem for artifacts derived from a class name, `MyIcons` -> `my_icons`.
pub fn snake_case(class_name: &str) -> String {
    canonicalize(class_name)
}

/// Whether `name` can be used as the generated Dart class name.
pub fn is_valid_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !is_reserved(name)
        && name != "Function"
}

/// Whether `name` is a valid Dart package name (`lowercase_with_underscores`).
pub fn is_valid_package_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_identifier(s: &str) -> bool {
        s.starts_with(|c: char| c.is_ascii_lowercase() || c == '_')
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn canonicalize_separators_and_case() {
        assert_eq!(canonicalize("Home Icon"), "home_icon");
        assert_eq!(canonicalize("home-icon"), "home_icon");
        assert_eq!(canonicalize("HomeIcon"), "home_icon");
        assert_eq!(canonicalize("arrow.left--2"), "arrow_left_2");
        assert_eq!(canonicalize("__x__"), "x");
        assert_eq!(canonicalize("HTTPServer"), "httpserver");
        assert_eq!(canonicalize("ÄÖÜ"), "");
    }

    #[test]
    fn sanitize_prefixes_digit_led_names() {
        assert_eq!(sanitize("2fast"), "icon_2fast");
        assert_eq!(sanitize("404"), "icon_404");
    }

    #[test]
    fn sanitize_empty_uses_placeholder() {
        assert_eq!(sanitize(""), "icon");
        assert_eq!(sanitize("!!!"), "icon");
    }

    #[test]
    fn sanitize_appends_suffix_to_reserved_words() {
        assert_eq!(sanitize("class"), "class_icon");
        assert_eq!(sanitize("Switch"), "switch_icon");
        assert_eq!(sanitize("null"), "null_icon");
    }

    #[test]
    fn sanitize_is_idempotent_and_valid() {
        let samples = [
            "", " ", "2fast", "Home Icon", "class", "a__b", "_private", "ÜberIcon", "x-y.z",
            "camelCaseName", "9", "icon_9", "return_icon", "日本", "emoji_u1f600", "--",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
            assert!(is_identifier(&once), "{once:?} from {s:?}");
            assert!(!is_reserved(&once), "{once:?} is reserved");
        }
    }

    #[test]
    fn snake_case_class_names() {
        assert_eq!(snake_case("MyIcons"), "my_icons");
        assert_eq!(snake_case("AppIcons2"), "app_icons2");
    }

    #[test]
    fn type_and_package_names() {
        assert!(is_valid_type_name("MyIcons"));
        assert!(!is_valid_type_name("2Icons"));
        assert!(!is_valid_type_name("class"));
        assert!(!is_valid_type_name("My-Icons"));
        assert!(is_valid_package_name("my_app"));
        assert!(!is_valid_package_name("MyApp"));
    }
}
