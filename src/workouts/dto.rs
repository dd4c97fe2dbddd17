use serde::Deserialize;

use crate::{
    error::AppError,
    workouts::repo_types::{ArmType, ExerciseType},
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub notes: Option<String>,
}

/// Body of `POST /workouts/sessions/:id/exercises`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExerciseSet {
    pub exercise_type: ExerciseType,
    pub arm_used: ArmType,
    pub reps_completed: i32,
    pub set_number: i32,
    pub duration: Option<f64>,
    pub avg_angle_range: Option<f64>,
    pub form_quality_score: Option<f64>,
    pub rep_consistency_score: Option<f64>,
    pub avg_rep_speed: Option<f64>,
    pub min_angle_achieved: Option<f64>,
    pub max_angle_achieved: Option<f64>,
}

impl NewExerciseSet {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.reps_completed < 0 {
            return Err(AppError::MalformedInput("reps_completed must be >= 0".into()));
        }
        if self.set_number < 1 {
            return Err(AppError::MalformedInput("set_number must be >= 1".into()));
        }
        if matches!(self.duration, Some(d) if !(d.is_finite() && d >= 0.0)) {
            return Err(AppError::MalformedInput("duration must be a non-negative number".into()));
        }
        let metrics = [
            self.avg_angle_range,
            self.form_quality_score,
            self.rep_consistency_score,
            self.avg_rep_speed,
            self.min_angle_achieved,
            self.max_angle_achieved,
        ];
        if metrics.iter().flatten().any(|m| !m.is_finite()) {
            return Err(AppError::MalformedInput("metrics must be finite numbers".into()));
        }
        Ok(())
    }

    /// Seconds to add to the session total, if any.
    pub fn duration_increment(&self) -> Option<f64> {
        self.duration.filter(|d| *d != 0.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_limit() -> i64 { 10 }

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;

    /// Returns `(skip, limit)` with the limit clamped to `1..=MAX_LIMIT`.
    pub fn normalized(&self) -> Result<(i64, i64), AppError> {
        if self.skip < 0 {
            return Err(AppError::MalformedInput("skip must be >= 0".into()));
        }
        Ok((self.skip, self.limit.clamp(1, Self::MAX_LIMIT)))
    }
}
