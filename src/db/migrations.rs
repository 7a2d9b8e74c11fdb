//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: profiles and weight history
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PROFILES
        -- Current body metrics, one row per user
        -- ============================================
        CREATE TABLE profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL UNIQUE,
            weight_lb REAL CHECK (weight_lb IS NULL OR weight_lb > 0),  -- null: use latest weight sample
            height_in REAL CHECK (height_in IS NULL OR height_in > 0),
            age_years INTEGER CHECK (age_years IS NULL OR age_years > 0),
            sex TEXT CHECK (sex IS NULL OR sex IN ('male', 'female')),
            body_fat_pct REAL CHECK (body_fat_pct IS NULL OR (body_fat_pct >= 0 AND body_fat_pct <= 100)),
            activity_level TEXT NOT NULL CHECK (activity_level IN ('sedentary', 'light', 'moderate', 'active', 'very_active')),
            goal TEXT NOT NULL DEFAULT 'maintain' CHECK (goal IN ('cut', 'maintain', 'bulk')),

            -- Metadata
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- WEIGHT SAMPLES
        -- Append-only weight history, one sample per user per day
        -- ============================================
        CREATE TABLE weight_samples (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            weight_lb REAL NOT NULL CHECK (weight_lb > 0),
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(user_id, date)
        );

        CREATE INDEX idx_weight_samples_user_date ON weight_samples(user_id, date);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            assert!(!needs_migration(conn)?);
            run_migrations(conn)?;
            assert_eq!(get_schema_version(conn)?, SCHEMA_VERSION);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_weight_check_constraint() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|conn| {
            run_migrations(conn)?;
            conn.execute(
                "INSERT INTO weight_samples (user_id, date, weight_lb) VALUES ('a', '2025-01-01', 0)",
                [],
            )?;
            Ok(())
        });
        assert!(result.unwrap_err().is_constraint_violation());
    }

    #[test]
    fn test_body_fat_check_allows_full_range() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            conn.execute(
                "INSERT INTO profiles (user_id, body_fat_pct, activity_level) VALUES ('a', 100, 'light')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let result = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (user_id, body_fat_pct, activity_level) VALUES ('b', 100.1, 'light')",
                [],
            )?;
            Ok(())
        });
        assert!(result.unwrap_err().is_constraint_violation());
    }

    #[test]
    fn test_profile_user_id_is_unique() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|conn| {
            run_migrations(conn)?;
            for _ in 0..2 {
                conn.execute(
                    "INSERT INTO profiles (user_id, activity_level) VALUES ('a', 'light')",
                    [],
                )?;
            }
            Ok(())
        });
        assert!(result.unwrap_err().is_constraint_violation());
    }
}
