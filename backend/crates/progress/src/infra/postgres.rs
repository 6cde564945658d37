//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::id::{
    AssignmentId, BatchId, EnrollmentId, LiveSessionId, MaterialId, ProgressRecordId, StudentId,
    SubmissionId, UserId,
};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entity::coursework::{
    AssignmentRef, AttendanceMark, Coursework, MaterialActivity, MaterialRef, SessionRef,
    SubmissionRef,
};
use crate::domain::entity::enrollment::Enrollment;
use crate::domain::entity::progress_record::{
    AssignmentProgressItem, MaterialProgressItem, ProgressCounts, ProgressRecord,
    SessionAttendanceItem,
};
use crate::domain::repository::{CourseworkRepository, EnrollmentRepository, ProgressRepository};
use crate::domain::value_object::risk::RiskFactor;
use crate::domain::value_object::streak::Streak;
use crate::error::{ProgressError, ProgressResult};

/// PostgreSQL-backed progress repository
#[derive(Clone)]
pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Progress Repository Implementation
// ============================================================================

const PROGRESS_COLUMNS: &str = r#"
    record_id,
    student_id,
    batch_id,
    material_progress,
    session_attendance,
    assignment_progress,
    counts,
    material_percent,
    attendance_percent,
    assignment_percent,
    overall_progress,
    average_score,
    risk_factors,
    current_streak,
    longest_streak,
    last_active_at,
    last_learning_activity_at,
    calculated_at,
    created_at,
    updated_at
"#;

impl ProgressRepository for PgProgressRepository {
    async fn find(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<Option<ProgressRecord>> {
        let row = sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records WHERE student_id = $1 AND batch_id = $2"
        ))
        .bind(student_id.as_uuid())
        .bind(batch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProgressRow::into_record))
    }

    async fn find_by_batch(&self, batch_id: &BatchId) -> ProgressResult<Vec<ProgressRecord>> {
        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records WHERE batch_id = $1"
        ))
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProgressRow::into_record).collect())
    }

    async fn upsert(&self, record: &ProgressRecord) -> ProgressResult<()> {
        sqlx::query(
            r#"
            INSERT INTO progress_records (
                record_id,
                student_id,
                batch_id,
                material_progress,
                session_attendance,
                assignment_progress,
                counts,
                material_percent,
                attendance_percent,
                assignment_percent,
                overall_progress,
                average_score,
                risk_factors,
                is_at_risk,
                current_streak,
                longest_streak,
                last_active_at,
                last_learning_activity_at,
                calculated_at,
                created_at,
                updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
            )
            ON CONFLICT (student_id, batch_id) DO UPDATE SET
                material_progress = EXCLUDED.material_progress,
                session_attendance = EXCLUDED.session_attendance,
                assignment_progress = EXCLUDED.assignment_progress,
                counts = EXCLUDED.counts,
                material_percent = EXCLUDED.material_percent,
                attendance_percent = EXCLUDED.attendance_percent,
                assignment_percent = EXCLUDED.assignment_percent,
                overall_progress = EXCLUDED.overall_progress,
                average_score = EXCLUDED.average_score,
                risk_factors = EXCLUDED.risk_factors,
                is_at_risk = EXCLUDED.is_at_risk,
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_active_at = EXCLUDED.last_active_at,
                last_learning_activity_at = EXCLUDED.last_learning_activity_at,
                calculated_at = EXCLUDED.calculated_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.student_id.as_uuid())
        .bind(record.batch_id.as_uuid())
        .bind(Json(&record.material_progress))
        .bind(Json(&record.session_attendance))
        .bind(Json(&record.assignment_progress))
        .bind(Json(&record.counts))
        .bind(record.material_percent)
        .bind(record.attendance_percent)
        .bind(record.assignment_percent)
        .bind(record.overall_progress)
        .bind(record.average_score)
        .bind(Json(&record.risk_factors))
        .bind(record.is_at_risk())
        .bind(record.streak.current as i32)
        .bind(record.streak.longest as i32)
        .bind(record.streak.last_active)
        .bind(record.last_learning_activity_at)
        .bind(record.calculated_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Enrollment Repository Implementation
// ============================================================================

impl EnrollmentRepository for PgProgressRepository {
    async fn find_active(
        &self,
        student_id: &StudentId,
        batch_id: &BatchId,
    ) -> ProgressResult<Option<Enrollment>> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT enrollment_id, student_id, batch_id, status, payment_plan, enrolled_at
            FROM enrollments
            WHERE student_id = $1 AND batch_id = $2 AND status = 'active'
            "#,
        )
        .bind(student_id.as_uuid())
        .bind(batch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(EnrollmentRow::into_enrollment).transpose()
    }

    async fn list_active_by_batch(&self, batch_id: &BatchId) -> ProgressResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT enrollment_id, student_id, batch_id, status, payment_plan, enrolled_at
            FROM enrollments
            WHERE batch_id = $1 AND status = 'active'
            ORDER BY enrolled_at
            "#,
        )
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EnrollmentRow::into_enrollment).collect()
    }

    async fn list_active_by_student(
        &self,
        student_id: &StudentId,
    ) -> ProgressResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT enrollment_id, student_id, batch_id, status, payment_plan, enrolled_at
            FROM enrollments
            WHERE student_id = $1 AND status = 'active'
            ORDER BY enrolled_at
            "#,
        )
        .bind(student_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EnrollmentRow::into_enrollment).collect()
    }

    async fn batch_exists(&self, batch_id: &BatchId) -> ProgressResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM batches WHERE batch_id = $1)")
                .bind(batch_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn teaches_batch(
        &self,
        batch_id: &BatchId,
        instructor_id: &UserId,
    ) -> ProgressResult<bool> {
        let teaches: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM batches WHERE batch_id = $1 AND instructor_id = $2)",
        )
        .bind(batch_id.as_uuid())
        .bind(instructor_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(teaches)
    }

    async fn create(&self, enrollment: &Enrollment) -> ProgressResult<()> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (
                enrollment_id, student_id, batch_id, status, payment_plan, enrolled_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.student_id.as_uuid())
        .bind(enrollment.batch_id.as_uuid())
        .bind(enrollment.status.code())
        .bind(enrollment.payment_plan.code())
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ProgressError::AlreadyEnrolled
            } else {
                ProgressError::Database(e)
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// Coursework Repository Implementation
// ============================================================================

impl CourseworkRepository for PgProgressRepository {
    async fn load(&self, student_id: &StudentId, batch_id: &BatchId) -> ProgressResult<Coursework> {
        let materials = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT material_id, title
            FROM materials
            WHERE batch_id = $1 AND is_published
            ORDER BY created_at
            "#,
        )
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let sessions = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, title, scheduled_at
            FROM live_sessions
            WHERE batch_id = $1 AND status IN ('ongoing', 'completed')
            ORDER BY scheduled_at
            "#,
        )
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let assignments = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT assignment_id, title, max_score, due_at
            FROM assignments
            WHERE batch_id = $1 AND is_published
            ORDER BY created_at
            "#,
        )
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let material_activity = sqlx::query_as::<_, MaterialActivityRow>(
            r#"
            SELECT mp.material_id, mp.status, mp.percent, mp.time_spent_secs, mp.last_accessed_at
            FROM material_progress mp
            JOIN materials m ON m.material_id = mp.material_id
            WHERE mp.student_id = $1 AND m.batch_id = $2
            "#,
        )
        .bind(student_id.as_uuid())
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let attendance = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT sa.session_id, sa.status, sa.duration_minutes, sa.joined_at
            FROM session_attendance sa
            JOIN live_sessions s ON s.session_id = sa.session_id
            WHERE sa.student_id = $1 AND s.batch_id = $2
            "#,
        )
        .bind(student_id.as_uuid())
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let submissions = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT sub.submission_id, sub.assignment_id, sub.status, sub.score, sub.submitted_at
            FROM submissions sub
            JOIN assignments a ON a.assignment_id = sub.assignment_id
            WHERE sub.student_id = $1 AND a.batch_id = $2
            "#,
        )
        .bind(student_id.as_uuid())
        .bind(batch_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(Coursework {
            materials: materials.into_iter().map(MaterialRow::into_ref).collect(),
            sessions: sessions.into_iter().map(SessionRow::into_ref).collect(),
            assignments: assignments.into_iter().map(AssignmentRow::into_ref).collect(),
            material_activity: material_activity
                .into_iter()
                .map(MaterialActivityRow::into_activity)
                .collect::<ProgressResult<_>>()?,
            attendance: attendance
                .into_iter()
                .map(AttendanceRow::into_mark)
                .collect::<ProgressResult<_>>()?,
            submissions: submissions
                .into_iter()
                .map(SubmissionRow::into_ref)
                .collect::<ProgressResult<_>>()?,
        })
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProgressRow {
    record_id: Uuid,
    student_id: Uuid,
    batch_id: Uuid,
    material_progress: Json<Vec<MaterialProgressItem>>,
    session_attendance: Json<Vec<SessionAttendanceItem>>,
    assignment_progress: Json<Vec<AssignmentProgressItem>>,
    counts: Json<ProgressCounts>,
    material_percent: f64,
    attendance_percent: f64,
    assignment_percent: f64,
    overall_progress: f64,
    average_score: Option<f64>,
    risk_factors: Json<Vec<RiskFactor>>,
    current_streak: i32,
    longest_streak: i32,
    last_active_at: Option<DateTime<Utc>>,
    last_learning_activity_at: DateTime<Utc>,
    calculated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProgressRow {
    fn into_record(self) -> ProgressRecord {
        ProgressRecord {
            id: ProgressRecordId::from_uuid(self.record_id),
            student_id: StudentId::from_uuid(self.student_id),
            batch_id: BatchId::from_uuid(self.batch_id),
            material_progress: self.material_progress.0,
            session_attendance: self.session_attendance.0,
            assignment_progress: self.assignment_progress.0,
            counts: self.counts.0,
            material_percent: self.material_percent,
            attendance_percent: self.attendance_percent,
            assignment_percent: self.assignment_percent,
            overall_progress: self.overall_progress,
            average_score: self.average_score,
            risk_factors: self.risk_factors.0,
            streak: Streak {
                current: self.current_streak.max(0) as u32,
                longest: self.longest_streak.max(0) as u32,
                last_active: self.last_active_at,
            },
            last_learning_activity_at: self.last_learning_activity_at,
            calculated_at: self.calculated_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    enrollment_id: Uuid,
    student_id: Uuid,
    batch_id: Uuid,
    status: String,
    payment_plan: String,
    enrolled_at: DateTime<Utc>,
}

impl EnrollmentRow {
    fn into_enrollment(self) -> ProgressResult<Enrollment> {
        Ok(Enrollment {
            id: EnrollmentId::from_uuid(self.enrollment_id),
            student_id: StudentId::from_uuid(self.student_id),
            batch_id: BatchId::from_uuid(self.batch_id),
            status: self.status.parse()?,
            payment_plan: self.payment_plan.parse()?,
            enrolled_at: self.enrolled_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MaterialRow {
    material_id: Uuid,
    title: String,
}

impl MaterialRow {
    fn into_ref(self) -> MaterialRef {
        MaterialRef {
            material_id: MaterialId::from_uuid(self.material_id),
            title: self.title,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    title: String,
    scheduled_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_ref(self) -> SessionRef {
        SessionRef {
            session_id: LiveSessionId::from_uuid(self.session_id),
            title: self.title,
            scheduled_at: self.scheduled_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    assignment_id: Uuid,
    title: String,
    max_score: f64,
    due_at: Option<DateTime<Utc>>,
}

impl AssignmentRow {
    fn into_ref(self) -> AssignmentRef {
        AssignmentRef {
            assignment_id: AssignmentId::from_uuid(self.assignment_id),
            title: self.title,
            max_score: self.max_score,
            due_at: self.due_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MaterialActivityRow {
    material_id: Uuid,
    status: String,
    percent: f64,
    time_spent_secs: i64,
    last_accessed_at: Option<DateTime<Utc>>,
}

impl MaterialActivityRow {
    fn into_activity(self) -> ProgressResult<MaterialActivity> {
        Ok(MaterialActivity {
            material_id: MaterialId::from_uuid(self.material_id),
            status: self.status.parse()?,
            percent: self.percent,
            time_spent_secs: self.time_spent_secs,
            last_accessed_at: self.last_accessed_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    session_id: Uuid,
    status: String,
    duration_minutes: i32,
    joined_at: Option<DateTime<Utc>>,
}

impl AttendanceRow {
    fn into_mark(self) -> ProgressResult<AttendanceMark> {
        Ok(AttendanceMark {
            session_id: LiveSessionId::from_uuid(self.session_id),
            status: self.status.parse()?,
            duration_minutes: self.duration_minutes,
            joined_at: self.joined_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    submission_id: Uuid,
    assignment_id: Uuid,
    status: String,
    score: Option<f64>,
    submitted_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_ref(self) -> ProgressResult<SubmissionRef> {
        Ok(SubmissionRef {
            submission_id: SubmissionId::from_uuid(self.submission_id),
            assignment_id: AssignmentId::from_uuid(self.assignment_id),
            status: self.status.parse()?,
            score: self.score,
            submitted_at: self.submitted_at,
        })
    }
}
