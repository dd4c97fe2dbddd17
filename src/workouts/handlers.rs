use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::AppError,
    state::AppState,
};

use super::{
    dto::{CreateSessionRequest, NewExerciseSet, Pagination},
    repo_types::{ExerciseSet, PersonalBest, WorkoutSession},
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts/sessions", post(create_session).get(list_sessions))
        .route(
            "/workouts/sessions/:id/exercises",
            post(add_exercise).get(list_exercises),
        )
        .route("/workouts/personal-bests", get(list_personal_bests))
}

#[instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<WorkoutSession>, AppError> {
    let Json(body) = body?;
    let session = state.workouts.create_session(user.id, body.notes).await?;
    info!(user_id = %user.id, session_id = %session.id, "workout session created");
    Ok(Json(session))
}

#[instrument(skip_all)]
pub async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<WorkoutSession>>, AppError> {
    let Query(p) = query?;
    let (skip, limit) = p.normalized()?;
    let sessions = state.workouts.list_sessions(user.id, skip, limit).await?;
    Ok(Json(sessions))
}

#[instrument(skip_all)]
pub async fn add_exercise(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<NewExerciseSet>, JsonRejection>,
) -> Result<Json<ExerciseSet>, AppError> {
    let Path(id) = path?;
    let Json(body) = body?;
    body.validate()?;
    let set = state
        .workouts
        .add_exercise_set(user.id, id, &body)
        .await?
        .ok_or(AppError::NotFound("Workout session"))?;
    info!(user_id = %user.id, session_id = %id, set_id = %set.id, "exercise set recorded");
    Ok(Json(set))
}

#[instrument(skip_all)]
pub async fn list_exercises(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ExerciseSet>>, AppError> {
    let Path(id) = path?;
    state
        .workouts
        .find_session(user.id, id)
        .await?
        .ok_or(AppError::NotFound("Workout session"))?;
    let sets = state.workouts.list_exercise_sets(id).await?;
    Ok(Json(sets))
}

#[instrument(skip_all)]
pub async fn list_personal_bests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PersonalBest>>, AppError> {
    let bests = state.workouts.list_personal_bests(user.id).await?;
    Ok(Json(bests))
}
