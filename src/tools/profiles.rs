//! Profile tools

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::{logged, normalize_user_id, ToolError, ToolResult};
use crate::db::Database;
use crate::estimator::{validate_metrics, validate_weight, ActivityLevel, Goal, Sex};
use crate::models::{ProfileUpsert, StoredProfile, WeightSample};

/// Body metrics stored for a user. Weight may be left out when weight samples
/// are recorded instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ProfileFields {
    /// Body weight in pounds
    pub weight: Option<f64>,
    /// Height in inches
    pub height: Option<f64>,
    /// Age in years
    pub age: Option<u32>,
    /// male or female
    #[serde(alias = "gender")]
    pub sex: Option<String>,
    /// Body fat percentage in [0, 100]
    pub body_fat_pct: Option<f64>,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: String,
    /// cut, maintain or bulk (default maintain)
    pub goal: Option<String>,
}

impl ProfileFields {
    fn to_upsert(&self, user_id: String) -> ToolResult<ProfileUpsert> {
        let activity = ActivityLevel::parse(&self.activity_level)?;
        let sex = self.sex.as_deref().map(Sex::parse).transpose()?;
        let goal = self.goal.as_deref().map(Goal::parse).transpose()?.unwrap_or_default();
        if let Some(weight) = self.weight {
            validate_weight(weight)?;
        }
        validate_metrics(self.height, self.age, self.body_fat_pct)?;

        Ok(ProfileUpsert {
            user_id,
            weight_lb: self.weight,
            height_in: self.height,
            age_years: self.age,
            sex,
            body_fat_pct: self.body_fat_pct,
            activity,
            goal,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub profile: StoredProfile,
    pub latest_weight: Option<WeightSample>,
}

#[derive(Debug, Serialize)]
pub struct ListProfilesResponse {
    pub profiles: Vec<StoredProfile>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteProfileResponse {
    pub success: bool,
    pub message: String,
}

/// Create or replace a user's profile
pub fn set_profile(db: &Database, user_id: &str, fields: &ProfileFields) -> ToolResult<ProfileDetail> {
    logged("set_profile", || {
        let user_id = normalize_user_id(user_id)?;
        let data = fields.to_upsert(user_id)?;

        let (profile, latest_weight) = db.with_conn(|conn| {
            let profile = StoredProfile::upsert(conn, &data)?;
            let latest = WeightSample::latest(conn, &profile.user_id)?;
            Ok((profile, latest))
        })?;
        tracing::info!(user_id = %profile.user_id, "profile saved");

        Ok(ProfileDetail {
            profile,
            latest_weight,
        })
    })
}

/// Get a user's profile with their most recent weight sample
pub fn get_profile(db: &Database, user_id: &str) -> ToolResult<ProfileDetail> {
    logged("get_profile", || {
        let user_id = normalize_user_id(user_id)?;
        let (profile, latest_weight) = db.with_conn(|conn| {
            Ok((
                StoredProfile::get(conn, &user_id)?,
                WeightSample::latest(conn, &user_id)?,
            ))
        })?;
        let profile = profile
            .ok_or_else(|| ToolError::NotFound(format!("No profile for user '{}'", user_id)))?;

        Ok(ProfileDetail {
            profile,
            latest_weight,
        })
    })
}

/// List every stored profile
pub fn list_profiles(db: &Database) -> ToolResult<ListProfilesResponse> {
    logged("list_profiles", || {
        let profiles = db.with_conn(StoredProfile::list)?;
        let total = profiles.len();
        Ok(ListProfilesResponse { profiles, total })
    })
}

/// Delete a user's profile, keeping their weight history
pub fn delete_profile(db: &Database, user_id: &str) -> ToolResult<DeleteProfileResponse> {
    logged("delete_profile", || {
        let user_id = normalize_user_id(user_id)?;
        let deleted = db.with_conn(|conn| StoredProfile::delete(conn, &user_id))?;
        if !deleted {
            return Err(ToolError::NotFound(format!("No profile for user '{}'", user_id)));
        }
        tracing::info!(user_id = %user_id, "profile deleted");

        Ok(DeleteProfileResponse {
            success: true,
            message: format!("Profile for '{}' deleted; weight history kept", user_id),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::tools::StatusClass;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(migrations::run_migrations).unwrap();
        db
    }

    fn fields() -> ProfileFields {
        ProfileFields {
            weight: Some(180.0),
            height: Some(70.0),
            age: Some(30),
            sex: Some("Male".to_string()),
            activity_level: "Very Active".to_string(),
            goal: Some("bulking".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_and_get_profile() {
        let db = setup();
        let saved = set_profile(&db, " alex ", &fields()).unwrap();
        assert_eq!(saved.profile.user_id, "alex");
        assert_eq!(saved.profile.sex, Some(Sex::Male));
        assert_eq!(saved.profile.activity, ActivityLevel::VeryActive);
        assert_eq!(saved.profile.goal, Goal::Bulk);
        assert!(saved.latest_weight.is_none());

        let fetched = get_profile(&db, "alex").unwrap();
        assert_eq!(fetched.profile, saved.profile);
    }

    #[test]
    fn test_set_profile_rejects_bad_fields() {
        let db = setup();

        let mut bad_sex = fields();
        bad_sex.sex = Some("other".to_string());
        assert_eq!(
            set_profile(&db, "alex", &bad_sex).unwrap_err().status_class(),
            StatusClass::BadRequest
        );

        let mut bad_body_fat = fields();
        bad_body_fat.body_fat_pct = Some(120.0);
        assert!(set_profile(&db, "alex", &bad_body_fat).is_err());

        let mut bad_weight = fields();
        bad_weight.weight = Some(-1.0);
        assert!(set_profile(&db, "alex", &bad_weight).is_err());

        assert_eq!(list_profiles(&db).unwrap().total, 0);
    }

    #[test]
    fn test_profile_without_weight_is_accepted() {
        let db = setup();
        let mut no_weight = fields();
        no_weight.weight = None;
        let saved = set_profile(&db, "alex", &no_weight).unwrap();
        assert_eq!(saved.profile.weight_lb, None);
    }

    #[test]
    fn test_list_and_delete() {
        let db = setup();
        set_profile(&db, "sam", &fields()).unwrap();
        set_profile(&db, "alex", &fields()).unwrap();

        let listed = list_profiles(&db).unwrap();
        assert_eq!(listed.total, 2);
        assert_eq!(listed.profiles[0].user_id, "alex");

        assert!(delete_profile(&db, "sam").unwrap().success);
        let err = delete_profile(&db, "sam").unwrap_err();
        assert_eq!(err.status_class(), StatusClass::NotFound);
        assert_eq!(
            get_profile(&db, "sam").unwrap_err().status_class(),
            StatusClass::NotFound
        );
    }
}
