use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exercise_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    BicepCurl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "arm_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArmType {
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub session_date: OffsetDateTime,
    pub total_duration: Option<f64>, // seconds
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub session_id: Uuid,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PersonalBest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_type: ExerciseType,
    pub arm_used: ArmType,
    pub max_reps_single_set: Option<i32>,
    pub max_total_reps_session: Option<i32>,
    pub best_form_score: Option<f64>,
    pub longest_session_duration: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub achieved_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}
