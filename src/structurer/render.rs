use std::borrow::Cow;

use super::blocks::Block;

const HEADING_PREFIX: &str = "### ";
const BLOCK_SEPARATOR: &str = "\n\n";

/// Render one block to its output text. Headings get the level-3 marker;
/// emphasis and plain lines are already in final form.
pub fn render(block: &Block) -> Cow<'_, str> {
    match block {
        Block::Heading(title) => Cow::Owned(format!("{HEADING_PREFIX}{title}")),
        Block::Emphasis(text) | Block::Plain(text) => Cow::Borrowed(text),
    }
}

/// Join rendered blocks with blank lines. The separator is what keeps every
/// heading off its neighbours, so each entry must be a single trimmed line.
pub fn assemble(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}
