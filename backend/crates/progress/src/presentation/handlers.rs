//! HTTP Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::id::{BatchId, StudentId};
use kernel::principal::{Principal, Role};
use std::sync::Arc;

use crate::application::config::ProgressConfig;
use crate::application::{
    BatchDashboard, BatchDashboardUseCase, CalculateProgressUseCase, EnrollStudentUseCase,
    StudentOverview, StudentOverviewUseCase, StudentProgressSummary,
};
use crate::domain::entity::enrollment::Enrollment;
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::domain::value_object::streak::StreakUpdate;
use crate::error::{ProgressError, ProgressResult};
use crate::presentation::dto::{AtRiskQuery, EnrollRequest, ProgressRecordResponse};

const STAFF: &[Role] = &[Role::Instructor, Role::Admin];
const ADMIN: &[Role] = &[Role::Admin];

/// Shared state for progress handlers
#[derive(Clone)]
pub struct ProgressAppState<R>
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<ProgressConfig>,
}

/// POST /api/progress/students/{student_id}/batches/{batch_id}/calculate
pub async fn calculate<R>(
    State(state): State<ProgressAppState<R>>,
    Extension(principal): Extension<Principal>,
    Path((student_id, batch_id)): Path<(StudentId, BatchId)>,
) -> ProgressResult<Json<ProgressRecordResponse>>
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    principal.require_self_or_staff(&student_id)?;

    // Only the student's own request counts as their activity
    let update = if principal.user_id == student_id {
        StreakUpdate::Touch
    } else {
        StreakUpdate::Keep
    };

    let use_case =
        CalculateProgressUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let record = use_case.execute_with(&student_id, &batch_id, update).await?;

    Ok(Json(record.into()))
}

/// GET /api/progress/students/{student_id}/overview
pub async fn student_overview<R>(
    State(state): State<ProgressAppState<R>>,
    Extension(principal): Extension<Principal>,
    Path(student_id): Path<StudentId>,
) -> ProgressResult<Json<StudentOverview>>
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    principal.require_self_or_staff(&student_id)?;

    let use_case =
        StudentOverviewUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    Ok(Json(use_case.execute(&student_id).await?))
}

/// GET /api/progress/batches/{batch_id}/dashboard
pub async fn batch_dashboard<R>(
    State(state): State<ProgressAppState<R>>,
    Extension(principal): Extension<Principal>,
    Path(batch_id): Path<BatchId>,
) -> ProgressResult<Json<BatchDashboard>>
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    require_batch_staff(state.repo.as_ref(), &principal, &batch_id).await?;

    let use_case = BatchDashboardUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    Ok(Json(use_case.dashboard(&batch_id).await?))
}

/// GET /api/progress/batches/{batch_id}/at-risk?threshold=60
pub async fn at_risk_students<R>(
    State(state): State<ProgressAppState<R>>,
    Extension(principal): Extension<Principal>,
    Path(batch_id): Path<BatchId>,
    Query(query): Query<AtRiskQuery>,
) -> ProgressResult<Json<Vec<StudentProgressSummary>>>
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    require_batch_staff(state.repo.as_ref(), &principal, &batch_id).await?;

    let use_case = BatchDashboardUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    Ok(Json(
        use_case.at_risk_students(&batch_id, query.threshold).await?,
    ))
}

/// POST /api/progress/enrollments
///
/// Admin-only: an enrollment is registered once payment has been taken,
/// never by the student.
pub async fn enroll<R>(
    State(state): State<ProgressAppState<R>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<EnrollRequest>,
) -> ProgressResult<(StatusCode, Json<Enrollment>)>
where
    R: ProgressRepository
        + EnrollmentRepository
        + CourseworkRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    principal.require_role(ADMIN)?;

    let use_case = EnrollStudentUseCase::new(state.repo.clone());
    let enrollment = use_case
        .execute(&req.student_id, &req.batch_id, req.payment_plan)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Staff only; an instructor must teach the batch. Unknown batches pass so
/// the use case can report them as not found.
async fn require_batch_staff<R>(
    repo: &R,
    principal: &Principal,
    batch_id: &BatchId,
) -> ProgressResult<()>
where
    R: EnrollmentRepository + Sync,
{
    principal.require_role(STAFF)?;
    if principal.role == Role::Instructor
        && !repo.teaches_batch(batch_id, &principal.user_id).await?
        && repo.batch_exists(batch_id).await?
    {
        return Err(ProgressError::Forbidden(
            "Instructors may only view their own batches".to_string(),
        ));
    }
    Ok(())
}
