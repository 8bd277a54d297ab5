//! Reorganizes loosely formatted, AI-written security briefs into clean
//! structured text for a markdown-style renderer.

pub mod brief;
pub mod db;
pub mod settings;
pub mod structurer;

pub use structurer::{structure, structure_blocks, structure_field, Block};
