//! Weight history model
//!
//! Append-only weight samples, one per user per calendar date, plus a
//! read-only trend summary over a series of them.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A recorded body weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSample {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub weight_lb: f64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for appending a weight sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSampleCreate {
    pub user_id: String,
    pub date: NaiveDate,
    pub weight_lb: f64,
    pub notes: Option<String>,
}

impl WeightSample {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            weight_lb: row.get("weight_lb")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Append a sample. A second sample for the same user and date violates
    /// the table's UNIQUE constraint.
    pub fn append(conn: &Connection, data: &WeightSampleCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO weight_samples (user_id, date, weight_lb, notes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.user_id, data.date, data.weight_lb, data.notes],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_samples WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(sample) => Ok(Some(sample)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Samples for a user in ascending date order; with a limit, the most recent `n`
    pub fn list_for_user(
        conn: &Connection,
        user_id: &str,
        limit: Option<i64>,
    ) -> DbResult<Vec<Self>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|n| n.max(0)).unwrap_or(-1);

        let mut stmt = conn.prepare(
            "SELECT * FROM (
                SELECT * FROM weight_samples WHERE user_id = ?1 ORDER BY date DESC LIMIT ?2
             ) ORDER BY date ASC",
        )?;
        let samples = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(samples)
    }

    /// Samples for a user with `start <= date <= end`, ascending
    pub fn list_between(
        conn: &Connection,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM weight_samples
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )?;
        let samples = stmt
            .query_map(params![user_id, start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(samples)
    }

    /// Most recent sample for a user
    pub fn latest(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM weight_samples WHERE user_id = ?1 ORDER BY date DESC LIMIT 1",
        )?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(sample) => Ok(Some(sample)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Direction and rate of weight change over a series of samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTrend {
    pub sample_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_weight_lb: f64,
    pub last_weight_lb: f64,
    pub min_weight_lb: f64,
    pub max_weight_lb: f64,
    pub total_change_lb: f64,
    pub days_spanned: i64,
    /// Least-squares slope of weight against day offset
    pub slope_lb_per_day: f64,
    pub weekly_rate_lb: f64,
}

impl WeightTrend {
    /// Summarize samples in any order; `None` for fewer than two samples or a
    /// single-day span
    pub fn from_samples(samples: &[WeightSample]) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }

        let mut ordered: Vec<&WeightSample> = samples.iter().collect();
        ordered.sort_by_key(|s| s.date);

        let first = ordered[0];
        let last = ordered[ordered.len() - 1];
        let days_spanned = (last.date - first.date).num_days();
        if days_spanned == 0 {
            return None;
        }

        let n = ordered.len() as f64;
        let points: Vec<(f64, f64)> = ordered
            .iter()
            .map(|s| ((s.date - first.date).num_days() as f64, s.weight_lb))
            .collect();
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let covariance: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let variance: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let slope_lb_per_day = covariance / variance;

        let (min_weight_lb, max_weight_lb) = ordered.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), s| (lo.min(s.weight_lb), hi.max(s.weight_lb)),
        );

        Some(Self {
            sample_count: ordered.len(),
            first_date: first.date,
            last_date: last.date,
            first_weight_lb: first.weight_lb,
            last_weight_lb: last.weight_lb,
            min_weight_lb,
            max_weight_lb,
            total_change_lb: last.weight_lb - first.weight_lb,
            days_spanned,
            slope_lb_per_day,
            weekly_rate_lb: slope_lb_per_day * 7.0,
        })
    }
}
