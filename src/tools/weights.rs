//! Weight history tools

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::{logged, normalize_user_id, parse_optional_date, ToolError, ToolResult};
use crate::db::Database;
use crate::estimator::validate_weight;
use crate::models::{WeightSample, WeightSampleCreate, WeightTrend};

/// Largest page of history returned in one call
pub const MAX_HISTORY_LIMIT: i64 = 1000;

#[derive(Debug, Serialize)]
pub struct RecordWeightResponse {
    pub success: bool,
    pub sample: WeightSample,
}

#[derive(Debug, Serialize)]
pub struct WeightHistoryResponse {
    pub user_id: String,
    pub samples: Vec<WeightSample>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WeightTrendResponse {
    pub user_id: String,
    pub trend: Option<WeightTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Append a weight sample, dated today when no date is given
pub fn record_weight(
    db: &Database,
    user_id: &str,
    date: Option<&str>,
    weight_lb: f64,
    notes: Option<String>,
) -> ToolResult<RecordWeightResponse> {
    logged("record_weight", || {
        let user_id = normalize_user_id(user_id)?;
        let date = parse_optional_date("date", date)?.unwrap_or_else(|| Local::now().date_naive());
        validate_weight(weight_lb)?;

        let data = WeightSampleCreate {
            user_id,
            date,
            weight_lb,
            notes,
        };
        let sample = db
            .with_conn(|conn| WeightSample::append(conn, &data))
            .map_err(|e| {
                if e.is_constraint_violation() {
                    ToolError::Conflict(format!(
                        "Weight already recorded for '{}' on {}; samples are append-only",
                        data.user_id, data.date
                    ))
                } else {
                    e.into()
                }
            })?;
        tracing::info!(user_id = %sample.user_id, date = %sample.date, weight_lb, "weight recorded");

        Ok(RecordWeightResponse {
            success: true,
            sample,
        })
    })
}

fn load_samples(
    db: &Database,
    user_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    limit: Option<i64>,
) -> ToolResult<Vec<WeightSample>> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ToolError::invalid(
                "start_date",
                format!("{} is after end_date {}", start, end),
            ));
        }
    }

    let samples = db.with_conn(|conn| match (start, end) {
        (None, None) => WeightSample::list_for_user(conn, user_id, limit),
        (start, end) => {
            // Dates are stored as YYYY-MM-DD text, so open bounds stay within four-digit years
            let earliest = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN);
            let latest = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
            let mut samples = WeightSample::list_between(
                conn,
                user_id,
                start.unwrap_or(earliest),
                end.unwrap_or(latest),
            )?;
            if let Some(n) = limit {
                let skip = samples.len().saturating_sub(n.max(0) as usize);
                samples.drain(..skip);
            }
            Ok(samples)
        }
    })?;
    Ok(samples)
}

/// Weight samples in ascending date order, optionally bounded by date and count
pub fn get_weight_history(
    db: &Database,
    user_id: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: Option<i64>,
) -> ToolResult<WeightHistoryResponse> {
    logged("get_weight_history", || {
        let user_id = normalize_user_id(user_id)?;
        let start = parse_optional_date("start_date", start_date)?;
        let end = parse_optional_date("end_date", end_date)?;
        let limit = limit.map(|n| n.clamp(1, MAX_HISTORY_LIMIT));

        let samples = load_samples(db, &user_id, start, end, limit)?;
        let total = samples.len();
        Ok(WeightHistoryResponse {
            user_id,
            samples,
            total,
        })
    })
}

/// Rate of change over the user's samples, optionally within a date range
pub fn get_weight_trend(
    db: &Database,
    user_id: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> ToolResult<WeightTrendResponse> {
    logged("get_weight_trend", || {
        let user_id = normalize_user_id(user_id)?;
        let start = parse_optional_date("start_date", start_date)?;
        let end = parse_optional_date("end_date", end_date)?;

        let samples = load_samples(db, &user_id, start, end, None)?;
        let trend = WeightTrend::from_samples(&samples);
        let message = trend.is_none().then(|| {
            format!(
                "Need samples on at least two different dates; found {}",
                samples.len()
            )
        });

        Ok(WeightTrendResponse {
            user_id,
            trend,
            message,
        })
    })
}
