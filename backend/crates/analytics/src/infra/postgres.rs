//! PostgreSQL Analytics Source
//!
//! Every scoped query filters batches with
//! `($1::uuid IS NULL OR b.batch_id = $1) AND ($2::uuid IS NULL OR b.course_id = $2)`
//! so one statement serves the system, batch and course views.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{BatchId, CourseId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::metrics::{
    BatchSummary, CompletedPayment, CourseSummary, EngagementCounts, EnrollmentBreakdown,
    FinancialTotals, OverviewCounts, ProgressSummary,
};
use crate::domain::repository::AnalyticsSource;
use crate::domain::value_object::{scope::Scope, time_range::TimeWindow};
use crate::error::AnalyticsResult;

/// PostgreSQL-backed analytics source
#[derive(Clone)]
pub struct PgAnalyticsSource {
    pool: PgPool,
}

impl PgAnalyticsSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AnalyticsSource for PgAnalyticsSource {
    async fn overview_counts(&self, window: &TimeWindow) -> AnalyticsResult<OverviewCounts> {
        let row = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'student') AS total_students,
                (SELECT COUNT(*) FROM users WHERE role = 'instructor') AS total_instructors,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM batches) AS total_batches,
                (SELECT COUNT(*) FROM batches WHERE status = 'ongoing') AS active_batches,
                (SELECT COUNT(*) FROM enrollments) AS total_enrollments,
                (SELECT COUNT(*) FROM enrollments
                    WHERE enrolled_at BETWEEN $1 AND $2) AS new_enrollments,
                (SELECT COUNT(*) FROM enrollments WHERE status = 'active') AS active_enrollments
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_counts())
    }

    async fn financial_totals(
        &self,
        scope: &Scope,
        window: &TimeWindow,
    ) -> AnalyticsResult<FinancialTotals> {
        let (batch, course) = scope.filters();
        let row = sqlx::query_as::<_, FinancialRow>(
            r#"
            SELECT
                COALESCE(SUM(p.amount) FILTER (
                    WHERE p.status = 'completed' AND p.paid_at BETWEEN $3 AND $4
                ), 0)::BIGINT AS revenue,
                COUNT(*) FILTER (
                    WHERE p.status = 'completed' AND p.paid_at BETWEEN $3 AND $4
                ) AS payment_count,
                COALESCE(SUM(p.amount) FILTER (
                    WHERE p.status = 'completed' AND p.paid_at BETWEEN $3 AND $4
                      AND p.payment_type = 'full'
                ), 0)::BIGINT AS full_revenue,
                COALESCE(SUM(p.amount) FILTER (
                    WHERE p.status = 'completed' AND p.paid_at BETWEEN $3 AND $4
                      AND p.payment_type = 'emi'
                ), 0)::BIGINT AS emi_revenue,
                COALESCE(SUM(p.amount) FILTER (WHERE p.status = 'pending'), 0)::BIGINT
                    AS pending_amount
            FROM payments p
            JOIN enrollments e ON e.enrollment_id = p.enrollment_id
            JOIN batches b ON b.batch_id = e.batch_id
            WHERE ($1::uuid IS NULL OR b.batch_id = $1)
              AND ($2::uuid IS NULL OR b.course_id = $2)
            "#,
        )
        .bind(batch)
        .bind(course)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_totals())
    }

    async fn engagement_counts(
        &self,
        scope: &Scope,
        window: &TimeWindow,
    ) -> AnalyticsResult<EngagementCounts> {
        let (batch, course) = scope.filters();
        let row = sqlx::query_as::<_, EngagementRow>(
            r#"
            WITH scoped AS (
                SELECT b.batch_id
                FROM batches b
                WHERE ($1::uuid IS NULL OR b.batch_id = $1)
                  AND ($2::uuid IS NULL OR b.course_id = $2)
            ),
            enrolled AS (
                SELECT e.batch_id, COUNT(*) AS students
                FROM enrollments e
                JOIN scoped s ON s.batch_id = e.batch_id
                WHERE e.status = 'active'
                GROUP BY e.batch_id
            ),
            held AS (
                SELECT ls.batch_id, COUNT(*) AS sessions
                FROM live_sessions ls
                JOIN scoped s ON s.batch_id = ls.batch_id
                WHERE ls.status = 'completed' AND ls.scheduled_at BETWEEN $3 AND $4
                GROUP BY ls.batch_id
            ),
            published_materials AS (
                SELECT m.batch_id, COUNT(*) AS materials
                FROM materials m
                JOIN scoped s ON s.batch_id = m.batch_id
                WHERE m.is_published
                GROUP BY m.batch_id
            ),
            published_assignments AS (
                SELECT a.batch_id, COUNT(*) AS assignments
                FROM assignments a
                JOIN scoped s ON s.batch_id = a.batch_id
                WHERE a.is_published
                GROUP BY a.batch_id
            )
            SELECT
                (SELECT COUNT(*)
                    FROM session_attendance sa
                    JOIN live_sessions ls ON ls.session_id = sa.session_id
                    JOIN scoped s ON s.batch_id = ls.batch_id
                    WHERE ls.status = 'completed'
                      AND ls.scheduled_at BETWEEN $3 AND $4
                      AND sa.status IN ('present', 'late')) AS attendance_marks,
                (SELECT COALESCE(SUM(h.sessions * e.students), 0)::BIGINT
                    FROM held h JOIN enrolled e ON e.batch_id = h.batch_id) AS session_slots,
                (SELECT COUNT(*)
                    FROM material_progress mp
                    JOIN materials m ON m.material_id = mp.material_id
                    JOIN scoped s ON s.batch_id = m.batch_id
                    WHERE m.is_published AND mp.status = 'completed') AS material_completions,
                (SELECT COALESCE(SUM(pm.materials * e.students), 0)::BIGINT
                    FROM published_materials pm
                    JOIN enrolled e ON e.batch_id = pm.batch_id) AS material_slots,
                (SELECT COUNT(DISTINCT (sub.assignment_id, sub.student_id))
                    FROM submissions sub
                    JOIN assignments a ON a.assignment_id = sub.assignment_id
                    JOIN scoped s ON s.batch_id = a.batch_id
                    WHERE a.is_published) AS submissions,
                (SELECT COALESCE(SUM(pa.assignments * e.students), 0)::BIGINT
                    FROM published_assignments pa
                    JOIN enrolled e ON e.batch_id = pa.batch_id) AS assignment_slots,
                (SELECT COUNT(DISTINCT d.student_id)
                    FROM doubts d
                    JOIN scoped s ON s.batch_id = d.batch_id
                    WHERE d.created_at BETWEEN $3 AND $4) AS distinct_askers,
                (SELECT COALESCE(SUM(e.students), 0)::BIGINT FROM enrolled e)
                    AS enrolled_students
            "#,
        )
        .bind(batch)
        .bind(course)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_counts())
    }

    async fn enrollment_breakdown(&self, scope: &Scope) -> AnalyticsResult<EnrollmentBreakdown> {
        let (batch, course) = scope.filters();
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT e.status, COUNT(*)
            FROM enrollments e
            JOIN batches b ON b.batch_id = e.batch_id
            WHERE ($1::uuid IS NULL OR b.batch_id = $1)
              AND ($2::uuid IS NULL OR b.course_id = $2)
            GROUP BY e.status
            "#,
        )
        .bind(batch)
        .bind(course)
        .fetch_all(&self.pool)
        .await?;

        let mut breakdown = EnrollmentBreakdown::default();
        for (status, count) in rows {
            breakdown.add(&status, count);
        }
        Ok(breakdown)
    }

    async fn progress_summary(&self, scope: &Scope) -> AnalyticsResult<ProgressSummary> {
        let (batch, course) = scope.filters();
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT
                COUNT(*) AS tracked_students,
                COALESCE(AVG(pr.overall_progress), 0)::FLOAT8 AS average_progress,
                COUNT(*) FILTER (WHERE pr.is_at_risk) AS at_risk_count
            FROM progress_records pr
            JOIN enrollments e
              ON e.student_id = pr.student_id
             AND e.batch_id = pr.batch_id
             AND e.status = 'active'
            JOIN batches b ON b.batch_id = pr.batch_id
            WHERE ($1::uuid IS NULL OR b.batch_id = $1)
              AND ($2::uuid IS NULL OR b.course_id = $2)
            "#,
        )
        .bind(batch)
        .bind(course)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProgressSummary {
            tracked_students: row.tracked_students,
            average_progress: row.average_progress,
            at_risk_count: row.at_risk_count,
        })
    }

    async fn find_batch(&self, batch_id: &BatchId) -> AnalyticsResult<Option<BatchSummary>> {
        let row = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT b.batch_id, b.course_id, c.title AS course_title, b.name, b.status,
                   b.instructor_id, b.start_date, b.end_date
            FROM batches b
            JOIN courses c ON c.course_id = b.course_id
            WHERE b.batch_id = $1
            "#,
        )
        .bind(batch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BatchRow::into_summary))
    }

    async fn find_course(&self, course_id: &CourseId) -> AnalyticsResult<Option<CourseSummary>> {
        let row = sqlx::query_as::<_, CourseRow>(
            "SELECT course_id, title, is_published, created_at FROM courses WHERE course_id = $1",
        )
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CourseSummary {
            course_id: CourseId::from_uuid(r.course_id),
            title: r.title,
            is_published: r.is_published,
            created_at: r.created_at,
        }))
    }

    async fn batch_count(&self, course_id: &CourseId) -> AnalyticsResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batches WHERE course_id = $1")
            .bind(course_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn teaches_course(
        &self,
        course_id: &CourseId,
        instructor_id: &UserId,
    ) -> AnalyticsResult<bool> {
        let teaches: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM batches WHERE course_id = $1 AND instructor_id = $2)",
        )
        .bind(course_id.as_uuid())
        .bind(instructor_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(teaches)
    }

    async fn completed_payments(
        &self,
        window: &TimeWindow,
    ) -> AnalyticsResult<Vec<CompletedPayment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT amount, payment_type, paid_at
            FROM payments
            WHERE status = 'completed' AND paid_at BETWEEN $1 AND $2
            ORDER BY paid_at
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }
}

// ============================================================================
// Row Types for SQLx
// ============================================================================

#[derive(sqlx::FromRow)]
struct OverviewRow {
    total_students: i64,
    total_instructors: i64,
    total_courses: i64,
    total_batches: i64,
    active_batches: i64,
    total_enrollments: i64,
    new_enrollments: i64,
    active_enrollments: i64,
}

impl OverviewRow {
    fn into_counts(self) -> OverviewCounts {
        OverviewCounts {
            total_students: self.total_students,
            total_instructors: self.total_instructors,
            total_courses: self.total_courses,
            total_batches: self.total_batches,
            active_batches: self.active_batches,
            total_enrollments: self.total_enrollments,
            new_enrollments: self.new_enrollments,
            active_enrollments: self.active_enrollments,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FinancialRow {
    revenue: i64,
    payment_count: i64,
    full_revenue: i64,
    emi_revenue: i64,
    pending_amount: i64,
}

impl FinancialRow {
    fn into_totals(self) -> FinancialTotals {
        FinancialTotals {
            revenue: self.revenue,
            payment_count: self.payment_count,
            full_revenue: self.full_revenue,
            emi_revenue: self.emi_revenue,
            pending_amount: self.pending_amount,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EngagementRow {
    attendance_marks: i64,
    session_slots: i64,
    material_completions: i64,
    material_slots: i64,
    submissions: i64,
    assignment_slots: i64,
    distinct_askers: i64,
    enrolled_students: i64,
}

impl EngagementRow {
    fn into_counts(self) -> EngagementCounts {
        EngagementCounts {
            attendance_marks: self.attendance_marks,
            session_slots: self.session_slots,
            material_completions: self.material_completions,
            material_slots: self.material_slots,
            submissions: self.submissions,
            assignment_slots: self.assignment_slots,
            distinct_askers: self.distinct_askers,
            enrolled_students: self.enrolled_students,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    tracked_students: i64,
    average_progress: f64,
    at_risk_count: i64,
}

#[derive(sqlx::FromRow)]
struct BatchRow {
    batch_id: Uuid,
    course_id: Uuid,
    course_title: String,
    name: String,
    status: String,
    instructor_id: Option<Uuid>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl BatchRow {
    fn into_summary(self) -> BatchSummary {
        BatchSummary {
            batch_id: BatchId::from_uuid(self.batch_id),
            course_id: CourseId::from_uuid(self.course_id),
            course_title: self.course_title,
            name: self.name,
            status: self.status,
            instructor_id: self.instructor_id.map(UserId::from_uuid),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CourseRow {
    course_id: Uuid,
    title: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    amount: i64,
    payment_type: String,
    paid_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> AnalyticsResult<CompletedPayment> {
        Ok(CompletedPayment {
            amount: self.amount,
            payment_type: self.payment_type.parse()?,
            paid_at: self.paid_at,
        })
    }
}
