//! Stored profile model
//!
//! Current body metrics for one user. Weight is optional here: when absent,
//! the latest weight sample stands in.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::estimator::{ActivityLevel, EstimateError, EstimateResult, Goal, Profile, Sex};

/// A user's stored profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: i64,
    pub user_id: String,
    pub weight_lb: Option<f64>,
    pub height_in: Option<f64>,
    pub age_years: Option<u32>,
    pub sex: Option<Sex>,
    pub body_fat_pct: Option<f64>,
    pub activity: ActivityLevel,
    pub goal: Goal,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating or replacing a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpsert {
    pub user_id: String,
    pub weight_lb: Option<f64>,
    pub height_in: Option<f64>,
    pub age_years: Option<u32>,
    pub sex: Option<Sex>,
    pub body_fat_pct: Option<f64>,
    pub activity: ActivityLevel,
    pub goal: Goal,
}

/// Parse an enumerated TEXT column, surfacing bad values as a conversion failure
fn parse_text_column<T>(
    row: &Row,
    column: &str,
    parse: fn(&str) -> EstimateResult<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    parse(&raw).map_err(|e| {
        let idx = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

impl StoredProfile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let sex = match row.get::<_, Option<String>>("sex")? {
            Some(_) => Some(parse_text_column(row, "sex", Sex::parse)?),
            None => None,
        };

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            weight_lb: row.get("weight_lb")?,
            height_in: row.get("height_in")?,
            age_years: row.get("age_years")?,
            sex,
            body_fat_pct: row.get("body_fat_pct")?,
            activity: parse_text_column(row, "activity_level", ActivityLevel::parse)?,
            goal: parse_text_column(row, "goal", Goal::parse)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Set or replace a user's profile
    pub fn upsert(conn: &Connection, data: &ProfileUpsert) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profiles (user_id, weight_lb, height_in, age_years, sex, body_fat_pct, activity_level, goal)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                weight_lb = excluded.weight_lb,
                height_in = excluded.height_in,
                age_years = excluded.age_years,
                sex = excluded.sex,
                body_fat_pct = excluded.body_fat_pct,
                activity_level = excluded.activity_level,
                goal = excluded.goal,
                updated_at = datetime('now')
            "#,
            params![
                data.user_id,
                data.weight_lb,
                data.height_in,
                data.age_years,
                data.sex.map(|s| s.as_str()),
                data.body_fat_pct,
                data.activity.as_str(),
                data.goal.as_str(),
            ],
        )?;

        Self::get(conn, &data.user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a profile by user identifier
    pub fn get(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all profiles, ordered by user identifier
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles ORDER BY user_id")?;
        let profiles = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(profiles)
    }

    /// Delete a profile. Weight history is left untouched.
    pub fn delete(conn: &Connection, user_id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM profiles WHERE user_id = ?1", [user_id])?;
        Ok(rows > 0)
    }

    /// Snapshot for the estimator, using `latest_weight_lb` when no weight is stored
    pub fn to_profile(&self, latest_weight_lb: Option<f64>) -> EstimateResult<Profile> {
        let weight_lb = self.weight_lb.or(latest_weight_lb).ok_or_else(|| {
            EstimateError::invalid(
                "weight_lb",
                format!(
                    "no weight stored for '{}' and no weight samples recorded",
                    self.user_id
                ),
            )
        })?;

        Ok(Profile {
            weight_lb,
            height_in: self.height_in,
            body_fat_pct: self.body_fat_pct,
            age_years: self.age_years,
            sex: self.sex,
            activity: self.activity,
            goal: self.goal,
        })
    }
}
