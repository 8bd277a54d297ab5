use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Marker used for every list item after normalization.
pub const LIST_MARKER: &str = "* ";

const LEGACY_SEPARATOR: &str = "|||";

// Bullet (`•`, `*`) or single-digit ordinal (`3.`).
const MARKER: &str = r"(?:•|\*|\d\.)";

static AFTER_TERMINATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"([.!?])\s*{MARKER}\s+")).unwrap());
static AFTER_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(\w)\s+{MARKER}\s+")).unwrap());
static LINE_ENDING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n?").unwrap());
static LINE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:•[ \t]*|\d\.[ \t]+)").unwrap());

/// One rewrite step of the normalization pass.
pub struct Rewrite {
    pub name: &'static str,
    pub apply: fn(&str) -> Cow<'_, str>,
}

/// Applied once each, in this order.
pub const REWRITES: &[Rewrite] = &[
    Rewrite {
        name: "unify_line_endings",
        apply: unify_line_endings,
    },
    Rewrite {
        name: "break_after_terminator",
        apply: break_after_terminator,
    },
    Rewrite {
        name: "break_after_word",
        apply: break_after_word,
    },
    Rewrite {
        name: "standardize_line_marker",
        apply: standardize_line_marker,
    },
    Rewrite {
        name: "drop_legacy_separator",
        apply: drop_legacy_separator,
    },
];

/// Run every rewrite over `raw` so that each list item starts its own line
/// with the standard `* ` marker.
pub fn normalize(raw: &str) -> String {
    let mut text = raw.to_string();
    for rewrite in REWRITES {
        if let Cow::Owned(next) = (rewrite.apply)(&text) {
            tracing::trace!(rule = rewrite.name, "normalization rewrote text");
            text = next;
        }
    }
    text
}

/// `\r\n` and lone `\r` become `\n`.
fn unify_line_endings(text: &str) -> Cow<'_, str> {
    LINE_ENDING_RE.replace_all(text, "\n")
}

/// `end. • next` → `end.\n\n* next`
fn break_after_terminator(text: &str) -> Cow<'_, str> {
    AFTER_TERMINATOR_RE.replace_all(text, "$1\n\n* ")
}

/// `word 2. next` → `word\n\n* next`
fn break_after_word(text: &str) -> Cow<'_, str> {
    AFTER_WORD_RE.replace_all(text, "$1\n\n* ")
}

fn standardize_line_marker(text: &str) -> Cow<'_, str> {
    LINE_START_RE.replace_all(text, LIST_MARKER)
}

fn drop_legacy_separator(text: &str) -> Cow<'_, str> {
    if text.contains(LEGACY_SEPARATOR) {
        Cow::Owned(text.replace(LEGACY_SEPARATOR, ""))
    } else {
        Cow::Borrowed(text)
    }
}
