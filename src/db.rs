use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::brief::{BriefRecord, StructuredBrief};

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Create the output table. The `articles` and `simplified_content` tables
/// belong to the publishing backend and are only read.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS structured_briefs (
            article_id           INTEGER PRIMARY KEY,
            slug                 TEXT NOT NULL,
            summary              TEXT NOT NULL,
            attack_vector        TEXT NOT NULL,
            impact               TEXT NOT NULL,
            reading_time_minutes INTEGER NOT NULL,
            structured_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_structured_slug ON structured_briefs(slug);
        ",
    )?;
    Ok(())
}

const BRIEF_SELECT: &str = "
    SELECT a.id, a.slug, a.title, s.friendly_summary, s.attack_vector, s.business_impact
    FROM simplified_content s
    JOIN articles a ON a.id = s.article_id";

fn brief_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BriefRecord> {
    Ok(BriefRecord {
        article_id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        friendly_summary: row.get(3)?,
        attack_vector: row.get(4)?,
        business_impact: row.get(5)?,
    })
}

/// Briefs in article order. With `only_pending`, skip articles that already
/// have a structured row.
pub fn fetch_briefs(
    conn: &Connection,
    limit: Option<usize>,
    only_pending: bool,
) -> Result<Vec<BriefRecord>> {
    let sql = format!(
        "{BRIEF_SELECT}{}
         ORDER BY a.id{}",
        if only_pending {
            " LEFT JOIN structured_briefs sb ON sb.article_id = a.id WHERE sb.article_id IS NULL"
        } else {
            ""
        },
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql).context("Failed to query briefs")?;
    let rows = stmt
        .query_map([], brief_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_brief(conn: &Connection, slug: &str) -> Result<Option<BriefRecord>> {
    let sql = format!("{BRIEF_SELECT} WHERE a.slug = ?1");
    let row = conn
        .query_row(&sql, [slug], brief_from_row)
        .optional()
        .with_context(|| format!("Failed to load brief {slug}"))?;
    Ok(row)
}

/// Upsert structured briefs in one transaction. Returns rows written.
pub fn save_structured(conn: &Connection, briefs: &[StructuredBrief]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO structured_briefs
             (article_id, slug, summary, attack_vector, impact, reading_time_minutes, structured_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for b in briefs {
            count += stmt.execute(rusqlite::params![
                b.article_id,
                b.slug,
                b.summary,
                b.attack_vector,
                b.impact,
                b.reading_time_minutes,
                b.structured_at.to_rfc3339(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct Stats {
    pub articles: usize,
    pub briefs: usize,
    pub structured: usize,
    pub pending: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let articles: usize = conn.query_row("SELECT COUNT(*) FROM articles", [], |r| r.get(0))?;
    let briefs: usize =
        conn.query_row("SELECT COUNT(*) FROM simplified_content", [], |r| r.get(0))?;
    let structured: usize =
        conn.query_row("SELECT COUNT(*) FROM structured_briefs", [], |r| r.get(0))?;
    let pending: usize = conn.query_row(
        "SELECT COUNT(*) FROM simplified_content s
         LEFT JOIN structured_briefs sb ON sb.article_id = s.article_id
         WHERE sb.article_id IS NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        articles,
        briefs,
        structured,
        pending,
    })
}
