/// Coarse value category inferred from a literal's source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralCategory {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Unknown,
}

impl LiteralCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Undefined => "Undefined",
            Self::Boolean => "Boolean",
            Self::Number => "Number",
            Self::String => "String",
            Self::Unknown => "Unknown",
        }
    }
}

pub fn classify_literal(raw: &str) -> LiteralCategory {
    match raw {
        "null" => LiteralCategory::Null,
        "undefined" => LiteralCategory::Undefined,
        "true" | "false" => LiteralCategory::Boolean,
        "NaN" | "Infinity" | "-Infinity" => LiteralCategory::Number,
        _ if is_quoted(raw) => LiteralCategory::String,
        _ if has_numeric_prefix(raw) => LiteralCategory::Number,
        _ => LiteralCategory::Unknown,
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.len() >= 2
        && ['"', '\'', '`']
            .into_iter()
            .any(|quote| raw.starts_with(quote) && raw.ends_with(quote))
}

/// Lenient numeric check: a leading (optionally signed) decimal digit or
/// `.digit` is enough, so `0x1F`, `1e3`, `10n` and `1_000` all count.
fn has_numeric_prefix(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(first) if first.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|next| next.is_ascii_digit()),
        _ => unsigned.starts_with("Infinity"),
    }
}
