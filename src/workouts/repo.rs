use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::PgStore,
    error::StoreError,
    workouts::{
        dto::NewExerciseSet,
        repo_types::{ExerciseSet, PersonalBest, WorkoutSession},
    },
};
#[cfg(test)]
use crate::memory::MemoryStore;

/// Workout data, always scoped by the owning user.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn create_session(
        &self,
        user_id: Uuid,
        notes: Option<String>,
    ) -> Result<WorkoutSession, StoreError>;

    async fn list_sessions(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorkoutSession>, StoreError>;

    async fn find_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<WorkoutSession>, StoreError>;

    /// Inserts the set and bumps the session's total duration in one atomic step.
    /// Returns `None` when the session does not exist or belongs to someone else.
    async fn add_exercise_set(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        set: &NewExerciseSet,
    ) -> Result<Option<ExerciseSet>, StoreError>;

    async fn list_exercise_sets(&self, session_id: Uuid) -> Result<Vec<ExerciseSet>, StoreError>;

    async fn list_personal_bests(&self, user_id: Uuid) -> Result<Vec<PersonalBest>, StoreError>;
}

#[async_trait]
impl WorkoutStore for PgStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        notes: Option<String>,
    ) -> Result<WorkoutSession, StoreError> {
        let row = sqlx::query_as::<_, WorkoutSession>(
            r#"
            INSERT INTO workout_sessions (id, user_id, notes)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, session_date, total_duration, notes
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_sessions(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorkoutSession>, StoreError> {
        let rows = sqlx::query_as::<_, WorkoutSession>(
            r#"
            SELECT id, user_id, session_date, total_duration, notes
            FROM workout_sessions
            WHERE user_id = $1
            ORDER BY session_date ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<WorkoutSession>, StoreError> {
        let row = sqlx::query_as::<_, WorkoutSession>(
            r#"
            SELECT id, user_id, session_date, total_duration, notes
            FROM workout_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn add_exercise_set(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        set: &NewExerciseSet,
    ) -> Result<Option<ExerciseSet>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_as::<_, (Uuid,)>(
            r#"
            SELECT id FROM workout_sessions
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, ExerciseSet>(
            r#"
            INSERT INTO exercise_sets (
                id, session_id, exercise_type, arm_used, reps_completed, set_number, duration,
                avg_angle_range, form_quality_score, rep_consistency_score, avg_rep_speed,
                min_angle_achieved, max_angle_achieved
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, session_id, exercise_type, arm_used, reps_completed, set_number,
                      duration, avg_angle_range, form_quality_score, rep_consistency_score,
                      avg_rep_speed, min_angle_achieved, max_angle_achieved, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(set.exercise_type)
        .bind(set.arm_used)
        .bind(set.reps_completed)
        .bind(set.set_number)
        .bind(set.duration)
        .bind(set.avg_angle_range)
        .bind(set.form_quality_score)
        .bind(set.rep_consistency_score)
        .bind(set.avg_rep_speed)
        .bind(set.min_angle_achieved)
        .bind(set.max_angle_achieved)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(secs) = set.duration_increment() {
            sqlx::query(
                r#"
                UPDATE workout_sessions
                SET total_duration = COALESCE(total_duration, 0) + $1
                WHERE id = $2
                "#,
            )
            .bind(secs)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn list_exercise_sets(&self, session_id: Uuid) -> Result<Vec<ExerciseSet>, StoreError> {
        let rows = sqlx::query_as::<_, ExerciseSet>(
            r#"
            SELECT id, session_id, exercise_type, arm_used, reps_completed, set_number,
                   duration, avg_angle_range, form_quality_score, rep_consistency_score,
                   avg_rep_speed, min_angle_achieved, max_angle_achieved, created_at
            FROM exercise_sets
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_personal_bests(&self, user_id: Uuid) -> Result<Vec<PersonalBest>, StoreError> {
        let rows = sqlx::query_as::<_, PersonalBest>(
            r#"
            SELECT id, user_id, exercise_type, arm_used, max_reps_single_set,
                   max_total_reps_session, best_form_score, longest_session_duration,
                   achieved_date, last_updated
            FROM personal_bests
            WHERE user_id = $1
            ORDER BY exercise_type, arm_used
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        notes: Option<String>,
    ) -> Result<WorkoutSession, StoreError> {
        let session = WorkoutSession {
            id: Uuid::new_v4(),
            user_id,
            session_date: time::OffsetDateTime::now_utc(),
            total_duration: None,
            notes,
        };
        self.tables.write().await.sessions.push(session.clone());
        Ok(session)
    }

    async fn list_sessions(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorkoutSession>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<WorkoutSession>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.user_id == user_id)
            .cloned())
    }

    async fn add_exercise_set(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        set: &NewExerciseSet,
    ) -> Result<Option<ExerciseSet>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(session) = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(secs) = set.duration_increment() {
            session.total_duration = Some(session.total_duration.unwrap_or(0.0) + secs);
        }

        let row = ExerciseSet {
            id: Uuid::new_v4(),
            session_id,
            exercise_type: set.exercise_type,
            arm_used: set.arm_used,
            reps_completed: set.reps_completed,
            set_number: set.set_number,
            duration: set.duration,
            avg_angle_range: set.avg_angle_range,
            form_quality_score: set.form_quality_score,
            rep_consistency_score: set.rep_consistency_score,
            avg_rep_speed: set.avg_rep_speed,
            min_angle_achieved: set.min_angle_achieved,
            max_angle_achieved: set.max_angle_achieved,
            created_at: time::OffsetDateTime::now_utc(),
        };
        tables.exercise_sets.push(row.clone());
        Ok(Some(row))
    }

    async fn list_exercise_sets(&self, session_id: Uuid) -> Result<Vec<ExerciseSet>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exercise_sets
            .iter()
            .filter(|s| s.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn list_personal_bests(&self, user_id: Uuid) -> Result<Vec<PersonalBest>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .personal_bests
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}
