use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::structurer::structure_field;

const WORDS_PER_MINUTE: usize = 200;
const MIN_READING_MINUTES: u32 = 2;

/// The AI-written text fields stored for one article.
#[derive(Debug, Clone, Default)]
pub struct BriefRecord {
    pub article_id: i64,
    pub slug: String,
    pub title: String,
    pub friendly_summary: Option<String>,
    pub attack_vector: Option<String>,
    pub business_impact: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuredBrief {
    pub article_id: i64,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub attack_vector: String,
    pub impact: String,
    pub reading_time_minutes: u32,
    pub structured_at: DateTime<Utc>,
}

impl StructuredBrief {
    /// Structure the three fields independently of each other.
    pub fn from_record(record: &BriefRecord) -> Self {
        let (summary, (attack_vector, impact)) = rayon::join(
            || structure_field(record.friendly_summary.as_deref()),
            || {
                rayon::join(
                    || structure_field(record.attack_vector.as_deref()),
                    || structure_field(record.business_impact.as_deref()),
                )
            },
        );

        StructuredBrief {
            article_id: record.article_id,
            slug: record.slug.clone(),
            title: record.title.clone(),
            summary,
            attack_vector,
            impact,
            reading_time_minutes: reading_time_minutes(
                record.friendly_summary.as_deref(),
                record.business_impact.as_deref(),
            ),
            structured_at: Utc::now(),
        }
    }

    /// Display label and text for each non-empty field, in reading order.
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("Summary", self.summary.as_str()),
            ("Technical Vector", self.attack_vector.as_str()),
            ("Business Impact", self.impact.as_str()),
        ]
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .collect()
    }
}

/// Estimated reading time from the raw summary and impact text.
pub fn reading_time_minutes(summary: Option<&str>, impact: Option<&str>) -> u32 {
    let words = [summary, impact]
        .iter()
        .flatten()
        .map(|t| t.split_whitespace().count())
        .sum::<usize>();
    let minutes = u32::try_from(words / WORDS_PER_MINUTE + 1).unwrap_or(u32::MAX);
    minutes.max(MIN_READING_MINUTES)
}

/// Structure many records in parallel, preserving input order.
pub fn structure_all(records: &[BriefRecord]) -> Vec<StructuredBrief> {
    records.par_iter().map(StructuredBrief::from_record).collect()
}
