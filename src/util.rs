use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::syntax::Span;

/// Layout seed derived from the analysed text, so the same source always
/// lands in the same arrangement.
pub fn stable_seed(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Byte offset of the `offset`-th UTF-16 code unit in `source`. Offsets past
/// the end or inside a surrogate pair give `None`.
pub fn utf16_to_byte_offset(source: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, ch) in source.char_indices() {
        if units >= offset {
            return (units == offset).then_some(byte);
        }
        units += ch.len_utf16();
    }
    (units == offset).then_some(source.len())
}

/// Source text covered by `span`, collapsed to one line and cut at
/// `max_chars` characters. Out-of-range spans give `None`.
pub fn source_excerpt(source: &str, span: Span, max_chars: usize) -> Option<String> {
    let start = utf16_to_byte_offset(source, span.start)?;
    let end = utf16_to_byte_offset(source, span.end)?;
    let text = source.get(start..end)?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        return Some(collapsed);
    }

    let mut excerpt = collapsed.chars().take(max_chars).collect::<String>();
    excerpt.push('…');
    Some(excerpt)
}

pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_stable_per_text() {
        assert_eq!(stable_seed("let a = 1;"), stable_seed("let a = 1;"));
        assert_ne!(stable_seed("let a = 1;"), stable_seed("let a = 2;"));
    }

    #[test]
    fn excerpt_collapses_whitespace_and_truncates() {
        let source = "function f() {\n    return 1;\n}";
        let span = Span {
            start: 0,
            end: source.len(),
        };

        assert_eq!(
            source_excerpt(source, span, 100).as_deref(),
            Some("function f() { return 1; }")
        );
        assert_eq!(source_excerpt(source, span, 8).as_deref(), Some("function…"));
    }

    #[test]
    fn excerpt_rejects_bad_spans() {
        let span = Span { start: 4, end: 40 };
        assert_eq!(source_excerpt("short", span, 10), None);
    }

    #[test]
    fn excerpt_counts_offsets_in_utf16_units() {
        let source = "// café\nconst x = 1;";
        let span = Span { start: 8, end: 20 };
        assert_eq!(source_excerpt(source, span, 100).as_deref(), Some("const x = 1;"));

        let source = "'🎉';\nlet y;";
        let span = Span { start: 6, end: 12 };
        assert_eq!(source_excerpt(source, span, 100).as_deref(), Some("let y;"));
    }

    #[test]
    fn utf16_offsets_map_to_char_boundaries() {
        let source = "a🎉b";
        assert_eq!(utf16_to_byte_offset(source, 0), Some(0));
        assert_eq!(utf16_to_byte_offset(source, 1), Some(1));
        assert_eq!(utf16_to_byte_offset(source, 2), None);
        assert_eq!(utf16_to_byte_offset(source, 3), Some(5));
        assert_eq!(utf16_to_byte_offset(source, 4), Some(6));
        assert_eq!(utf16_to_byte_offset(source, 5), None);
    }

    #[test]
    fn plural_matches_count() {
        assert_eq!(plural(1, "import"), "1 import");
        assert_eq!(plural(3, "import"), "3 imports");
    }
}
