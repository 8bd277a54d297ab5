use serde::Serialize;
use tracing::trace;

use super::normalize::LIST_MARKER;

/// Heading candidates longer than this may carry a mashed-in paragraph.
const MASHED_HEADING_MIN_CHARS: usize = 85;
/// Only a `". "` inside this many leading characters splits a mashed heading.
const MASHED_SPLIT_WINDOW: usize = 100;
/// Implicit headings must be strictly longer than this...
const PSEUDO_HEADING_MIN_CHARS: usize = 2;
/// ...and strictly shorter than this.
const PSEUDO_HEADING_MAX_CHARS: usize = 85;
/// List items with more words than this get a bolded lead-in.
const LEAD_IN_MIN_WORDS: usize = 5;
const LEAD_IN_BOLD_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Block {
    /// Section title, rendered as `### title`.
    Heading(String),
    /// Line with a bolded label or lead-in.
    Emphasis(String),
    /// Line passed through as-is.
    Plain(String),
}

/// A classification rule: if `matches` accepts the trimmed line, `build`
/// produces its blocks and no later rule is consulted.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub build: fn(&str) -> Vec<Block>,
}

/// Priority order. Lines matching none of these become [`Block::Plain`].
pub const RULES: &[Rule] = &[
    Rule {
        name: "explicit_heading",
        matches: is_explicit_heading,
        build: build_explicit_heading,
    },
    Rule {
        name: "pseudo_heading",
        matches: is_pseudo_heading,
        build: build_pseudo_heading,
    },
    Rule {
        name: "list_item",
        matches: is_list_item,
        build: build_list_item,
    },
];

/// Classify every non-empty line of normalized text.
pub fn classify_lines(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        blocks.extend(classify_line(line));
    }
    blocks
}

/// Classify a single trimmed, non-empty line. Usually yields one block; a
/// mashed heading yields a heading followed by a paragraph.
pub fn classify_line(line: &str) -> Vec<Block> {
    for rule in RULES {
        if (rule.matches)(line) {
            trace!(rule = rule.name, line, "classified");
            return (rule.build)(line);
        }
    }
    trace!(rule = "plain", line, "classified");
    vec![Block::Plain(line.to_string())]
}

// ── Predicates ──

pub(crate) fn is_explicit_heading(line: &str) -> bool {
    line.starts_with('#')
}

pub(crate) fn is_pseudo_heading(line: &str) -> bool {
    let len = line.chars().count();
    len > PSEUDO_HEADING_MIN_CHARS
        && len < PSEUDO_HEADING_MAX_CHARS
        && !line.ends_with('.')
        && !line.contains('*')
        && line
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

pub(crate) fn is_list_item(line: &str) -> bool {
    line.starts_with(LIST_MARKER)
}

// ── Builders ──

fn build_explicit_heading(line: &str) -> Vec<Block> {
    let candidate = strip_markup(line.trim_start_matches('#'));
    let candidate = candidate.trim();

    let (title, body) = match split_mashed_heading(candidate) {
        Some((title, body)) => (strip_markup(title), Some(body)),
        None => (candidate.to_string(), None),
    };

    let mut blocks = Vec::with_capacity(2);
    let title = title.trim();
    if !title.is_empty() {
        blocks.push(Block::Heading(title.to_string()));
    }
    if let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) {
        blocks.push(Block::Plain(body.to_string()));
    }
    blocks
}

fn build_pseudo_heading(line: &str) -> Vec<Block> {
    vec![Block::Heading(line.replace('*', ""))]
}

fn build_list_item(line: &str) -> Vec<Block> {
    let content = line[LIST_MARKER.len()..].trim();

    if let Some((key, value)) = content.split_once(": ") {
        return vec![Block::Emphasis(format!("**{key}:** {value}"))];
    }

    let words: Vec<&str> = content.split(' ').collect();
    if words.len() > LEAD_IN_MIN_WORDS {
        let lead = words[..LEAD_IN_BOLD_WORDS].join(" ");
        let rest = words[LEAD_IN_BOLD_WORDS..].join(" ");
        return vec![Block::Emphasis(format!("**{lead}** {rest}"))];
    }

    vec![Block::Plain(content.to_string())]
}

/// A heading that ran into its first sentence: `Title. Body text ...`.
/// Returns `(title, body)` split at the first `". "` if the candidate is long
/// enough and the separator sits inside the leading window.
fn split_mashed_heading(candidate: &str) -> Option<(&str, &str)> {
    if candidate.chars().count() <= MASHED_HEADING_MIN_CHARS {
        return None;
    }
    let window_end = candidate
        .char_indices()
        .nth(MASHED_SPLIT_WINDOW)
        .map_or(candidate.len(), |(i, _)| i);
    let idx = candidate[..window_end].find(". ")?;
    Some((&candidate[..idx], &candidate[idx + 2..]))
}

fn strip_markup(s: &str) -> String {
    s.replace(['#', '*'], "")
}
