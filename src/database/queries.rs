use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::{Entry, NewEntry, ScorePoint};

const ENTRY_COLUMNS: &str = "id, created_at, user_id, content, productivity_score,
        key_accomplishments, areas_for_improvement, actionable_tips, analysis_version";

fn encode_list(list: &Option<Vec<String>>) -> Result<Option<String>> {
    Ok(match list {
        Some(items) => Some(serde_json::to_string(items)?),
        None => None,
    })
}

fn decode_list(raw: Option<String>) -> Option<Vec<String>> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let score: Option<i64> = row.get(4)?;
    Ok(Entry {
        id: row.get(0)?,
        created_at: millis_to_datetime(row.get(1)?),
        user_id: row.get(2)?,
        content: row.get(3)?,
        productivity_score: score.and_then(|s| u8::try_from(s).ok()),
        key_accomplishments: decode_list(row.get(5)?),
        areas_for_improvement: decode_list(row.get(6)?),
        actionable_tips: decode_list(row.get(7)?),
        analysis_version: row.get(8)?,
    })
}

pub fn insert_entry(conn: &Connection, new_entry: &NewEntry) -> Result<Entry> {
    let id = Uuid::new_v4().to_string();
    // Stored at millisecond precision, so the returned entry matches what a later read yields.
    let created_at = millis_to_datetime(Utc::now().timestamp_millis());

    conn.execute(
        "INSERT INTO entries (id, created_at, user_id, content, productivity_score,
            key_accomplishments, areas_for_improvement, actionable_tips, analysis_version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            created_at.timestamp_millis(),
            new_entry.user_id,
            new_entry.content,
            new_entry.productivity_score.map(i64::from),
            encode_list(&new_entry.key_accomplishments)?,
            encode_list(&new_entry.areas_for_improvement)?,
            encode_list(&new_entry.actionable_tips)?,
            new_entry.analysis_version,
        ],
    )?;

    Ok(Entry {
        id,
        created_at,
        user_id: new_entry.user_id.clone(),
        content: new_entry.content.clone(),
        productivity_score: new_entry.productivity_score,
        key_accomplishments: new_entry.key_accomplishments.clone(),
        areas_for_improvement: new_entry.areas_for_improvement.clone(),
        actionable_tips: new_entry.actionable_tips.clone(),
        analysis_version: new_entry.analysis_version.clone(),
    })
}

pub fn get_entry(conn: &Connection, user_id: &str, id: &str) -> Result<Option<Entry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {} FROM entries WHERE id = ?1 AND user_id = ?2", ENTRY_COLUMNS),
            params![id, user_id],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

/// Entries owned by `user_id`, newest first.
pub fn list_entries(conn: &Connection, user_id: &str, limit: Option<u32>) -> Result<Vec<Entry>> {
    let limit_clause = limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
    let mut stmt = conn.prepare(&format!(
        "SELECT {}
         FROM entries
         WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC
         {}",
        ENTRY_COLUMNS, limit_clause
    ))?;

    let entries = stmt
        .query_map([user_id], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Replaces the content of an entry. Derived analysis columns are left as they are.
pub fn update_entry_content(
    conn: &Connection,
    user_id: &str,
    id: &str,
    content: &str,
) -> Result<Option<Entry>> {
    let updated = conn.execute(
        "UPDATE entries SET content = ?1 WHERE id = ?2 AND user_id = ?3",
        params![content, id, user_id],
    )?;

    if updated == 0 {
        return Ok(None);
    }
    get_entry(conn, user_id, id)
}

pub fn delete_entry(conn: &Connection, user_id: &str, id: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM entries WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(deleted > 0)
}

pub fn delete_entries_for_user(conn: &Connection, user_id: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM entries WHERE user_id = ?1", [user_id])?;
    Ok(deleted)
}

pub fn count_entries(conn: &Connection, user_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Average score per calendar day in `tz` for scored entries created at or after `since`,
/// oldest day first.
pub fn score_trend(
    conn: &Connection,
    user_id: &str,
    since: DateTime<Utc>,
    tz: Tz,
) -> Result<Vec<ScorePoint>> {
    let mut stmt = conn.prepare(
        "SELECT created_at, productivity_score
         FROM entries
         WHERE user_id = ?1 AND created_at >= ?2 AND productivity_score IS NOT NULL
         ORDER BY created_at ASC",
    )?;

    let rows = stmt
        .query_map(params![user_id, since.timestamp_millis()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut days: BTreeMap<String, (i64, u32)> = BTreeMap::new();
    for (created_at, score) in rows {
        let date_key = millis_to_datetime(created_at)
            .with_timezone(&tz)
            .format("%Y-%m-%d")
            .to_string();
        let bucket = days.entry(date_key).or_insert((0, 0));
        bucket.0 += score;
        bucket.1 += 1;
    }

    Ok(days
        .into_iter()
        .map(|(date, (total, entries))| ScorePoint {
            date,
            average_score: total as f64 / entries as f64,
            entries,
        })
        .collect())
}
