use tokio::sync::RwLock;

use crate::{
    auth::repo_types::User,
    workouts::repo_types::{ExerciseSet, PersonalBest, WorkoutSession},
};

#[derive(Default)]
pub(crate) struct Tables {
    pub users: Vec<User>,
    pub sessions: Vec<WorkoutSession>,
    pub exercise_sets: Vec<ExerciseSet>,
    pub personal_bests: Vec<PersonalBest>,
}

/// In-process store backing `AppState::fake` in tests.
///
/// Every write takes the single table lock, so multi-step writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_personal_best(&self, pb: PersonalBest) {
        self.tables.write().await.personal_bests.push(pb);
    }
}
