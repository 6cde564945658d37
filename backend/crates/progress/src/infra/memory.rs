//! In-memory Repository Implementations
//!
//! For tests and database-less runs. Coursework is seeded per
//! (student, batch) with [`InMemoryProgressRepository::put_coursework`].

use kernel::id::{BatchId, StudentId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entity::{
    coursework::Coursework, enrollment::Enrollment, progress_record::ProgressRecord,
};
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::error::{ProgressError, ProgressResult};

#[derive(Default)]
struct State {
    records: HashMap<(StudentId, BatchId), ProgressRecord>,
    enrollments: Vec<Enrollment>,
    batches: HashSet<BatchId>,
    instructors: HashMap<BatchId, UserId>,
    coursework: HashMap<(StudentId, BatchId), Coursework>,
}

#[derive(Clone, Default)]
pub struct InMemoryProgressRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_batch(&self, batch_id: BatchId) {
        self.state.write().await.batches.insert(batch_id);
    }

    pub async fn assign_instructor(&self, batch_id: BatchId, instructor_id: UserId) {
        let mut state = self.state.write().await;
        state.batches.insert(batch_id);
        state.instructors.insert(batch_id, instructor_id);
    }

    /// Replace what `load` returns for this student in this batch
    pub async fn put_coursework(&self, student_id: StudentId, batch_id: BatchId, coursework: Coursework) {
        self.state
            .write()
            .await
            .coursework
            .insert((student_id, batch_id), coursework);
    }

    /// Number of stored progress records
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

impl ProgressRepository for InMemoryProgressRepository {
    async fn find(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<Option<ProgressRecord>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .get(&(*student_id, *batch_id))
            .cloned())
    }

    async fn find_by_batch(&self, batch_id: &BatchId) -> ProgressResult<Vec<ProgressRecord>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .values()
            .filter(|r| &r.batch_id == batch_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, record: &ProgressRecord) -> ProgressResult<()> {
        let mut state = self.state.write().await;
        let key = (record.student_id, record.batch_id);
        let stored = match state.records.get(&key) {
            // Keep the identity of the first insert, as ON CONFLICT does
            Some(existing) => ProgressRecord {
                id: existing.id,
                created_at: existing.created_at,
                ..record.clone()
            },
            None => record.clone(),
        };
        state.records.insert(key, stored);
        Ok(())
    }
}

impl EnrollmentRepository for InMemoryProgressRepository {
    async fn find_active(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<Option<Enrollment>> {
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .iter()
            .find(|e| &e.student_id == student_id && &e.batch_id == batch_id && e.is_active())
            .cloned())
    }

    async fn list_active_by_batch(&self, batch_id: &BatchId) -> ProgressResult<Vec<Enrollment>> {
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .iter()
            .filter(|e| &e.batch_id == batch_id && e.is_active())
            .cloned()
            .collect())
    }

    async fn list_active_by_student(
        &self,
        student_id: &StudentId,
    ) -> ProgressResult<Vec<Enrollment>> {
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .iter()
            .filter(|e| &e.student_id == student_id && e.is_active())
            .cloned()
            .collect())
    }

    async fn batch_exists(&self, batch_id: &BatchId) -> ProgressResult<bool> {
        Ok(self.state.read().await.batches.contains(batch_id))
    }

    async fn teaches_batch(
        &self,
        batch_id: &BatchId,
        instructor_id: &UserId,
    ) -> ProgressResult<bool> {
        Ok(self.state.read().await.instructors.get(batch_id) == Some(instructor_id))
    }

    async fn create(&self, enrollment: &Enrollment) -> ProgressResult<()> {
        let mut state = self.state.write().await;
        let duplicate = state.enrollments.iter().any(|e| {
            e.student_id == enrollment.student_id
                && e.batch_id == enrollment.batch_id
                && e.is_active()
        });
        if duplicate && enrollment.is_active() {
            return Err(ProgressError::AlreadyEnrolled);
        }
        state.enrollments.push(enrollment.clone());
        Ok(())
    }
}

impl CourseworkRepository for InMemoryProgressRepository {
    async fn load(&self, student_id: &StudentId, batch_id: &BatchId) -> ProgressResult<Coursework> {
        Ok(self
            .state
            .read()
            .await
            .coursework
            .get(&(*student_id, *batch_id))
            .cloned()
            .unwrap_or_default())
    }
}
