//! Unit tests for the analytics crate

#[cfg(test)]
mod service_tests {
    use crate::application::config::AnalyticsConfig;
    use crate::application::service::{AnalyticsService, batch_key, system_key};
    use crate::domain::entity::metrics::{
        BatchSummary, CompletedPayment, CourseSummary, EngagementCounts, EnrollmentBreakdown,
        FinancialTotals, OverviewCounts, PaymentType, ProgressSummary,
    };
    use crate::domain::value_object::{scope::Scope, time_range::TimeRange};
    use crate::error::AnalyticsError;
    use crate::infra::memory::InMemoryAnalyticsSource;
    use cache::domain::{CacheEntry, KeyPattern};
    use cache::{
        CacheConfig, CacheError, CacheRepository, CacheResult, CacheService,
        InMemoryCacheRepository,
    };
    use chrono::{DateTime, Duration, Utc};
    use kernel::error::kind::ErrorKind;
    use kernel::id::{BatchId, CourseId};
    use std::sync::Arc;

    fn service(
        source: &InMemoryAnalyticsSource,
        cache: &InMemoryCacheRepository,
    ) -> AnalyticsService<InMemoryAnalyticsSource, InMemoryCacheRepository> {
        AnalyticsService::new(
            Arc::new(source.clone()),
            CacheService::new(Arc::new(cache.clone()), Arc::new(CacheConfig::default())),
            Arc::new(AnalyticsConfig::default()),
        )
    }

    async fn seeded_source() -> InMemoryAnalyticsSource {
        let source = InMemoryAnalyticsSource::new();
        source
            .set_overview(OverviewCounts {
                total_students: 40,
                total_instructors: 3,
                total_courses: 2,
                total_batches: 4,
                active_batches: 2,
                total_enrollments: 45,
                new_enrollments: 6,
                active_enrollments: 38,
            })
            .await;
        source
            .set_financial(
                Scope::System,
                FinancialTotals {
                    revenue: 120_000,
                    payment_count: 4,
                    full_revenue: 100_000,
                    emi_revenue: 20_000,
                    pending_amount: 15_000,
                },
            )
            .await;
        source
            .set_engagement(
                Scope::System,
                EngagementCounts {
                    attendance_marks: 30,
                    session_slots: 40,
                    material_completions: 20,
                    material_slots: 80,
                    submissions: 10,
                    assignment_slots: 20,
                    distinct_askers: 4,
                    enrolled_students: 40,
                },
            )
            .await;
        source
    }

    async fn add_batch(source: &InMemoryAnalyticsSource) -> (BatchId, CourseId) {
        let course_id = CourseId::new();
        let batch_id = BatchId::new();
        source
            .add_course(CourseSummary {
                course_id,
                title: "Systems Programming".to_string(),
                is_published: true,
                created_at: Utc::now() - Duration::days(100),
            })
            .await;
        source
            .add_batch(BatchSummary {
                batch_id,
                course_id,
                course_title: "Systems Programming".to_string(),
                name: "Spring cohort".to_string(),
                status: "ongoing".to_string(),
                instructor_id: None,
                start_date: None,
                end_date: None,
            })
            .await;
        (batch_id, course_id)
    }

    #[tokio::test]
    async fn test_system_report_is_computed_once_within_ttl() {
        let source = seeded_source().await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);

        let first = service.system(TimeRange::Last30Days).await.unwrap();
        let queries = source.query_count();
        assert!(queries > 0);

        let second = service.system(TimeRange::Last30Days).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.query_count(), queries);

        assert_eq!(first.overview.total_students, 40);
        assert_eq!(first.financial.average_payment, 30_000.0);
        assert_eq!(first.engagement.session_attendance_rate, 75.0);
        let expected = 0.3 * 75.0 + 0.25 * 25.0 + 0.3 * 50.0 + 0.15 * 10.0;
        assert!((first.engagement.overall_score - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ranges_are_cached_separately() {
        let source = seeded_source().await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);

        service.system(TimeRange::Last30Days).await.unwrap();
        let after_first = source.query_count();
        service.system(TimeRange::Last7Days).await.unwrap();

        assert!(source.query_count() > after_first);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_short_range_uses_short_ttl() {
        let source = seeded_source().await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);
        let before = Utc::now();

        service.system(TimeRange::Last24Hours).await.unwrap();
        service.system(TimeRange::Last90Days).await.unwrap();

        let short = cache.find(&system_key(TimeRange::Last24Hours)).await.unwrap().unwrap();
        let long = cache.find(&system_key(TimeRange::Last90Days)).await.unwrap().unwrap();
        assert!(short.expires_at <= before + Duration::seconds(301));
        assert!(long.expires_at >= before + Duration::seconds(3599));
    }

    #[tokio::test]
    async fn test_batch_report() {
        let source = seeded_source().await;
        let (batch_id, _) = add_batch(&source).await;
        let scope = Scope::Batch(batch_id);
        source
            .set_enrollments(
                scope,
                EnrollmentBreakdown {
                    total: 12,
                    active: 10,
                    completed: 1,
                    dropped: 1,
                    suspended: 0,
                },
            )
            .await;
        source
            .set_progress(
                scope,
                ProgressSummary {
                    tracked_students: 10,
                    average_progress: 64.5,
                    at_risk_count: 3,
                },
            )
            .await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);

        let report = service.batch(&batch_id, TimeRange::Last7Days).await.unwrap();

        assert_eq!(report.batch.name, "Spring cohort");
        assert_eq!(report.enrollments.active, 10);
        assert_eq!(report.progress.at_risk_count, 3);
        assert_eq!(report.engagement.overall_score, 0.0);
        assert!(cache.find(&batch_key(&batch_id, TimeRange::Last7Days)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_course_report_counts_batches() {
        let source = seeded_source().await;
        let (_, course_id) = add_batch(&source).await;
        source
            .set_progress(
                Scope::Course(course_id),
                ProgressSummary {
                    tracked_students: 4,
                    average_progress: 71.25,
                    at_risk_count: 1,
                },
            )
            .await;
        let service = service(&source, &InMemoryCacheRepository::new());

        let report = service.course(&course_id, TimeRange::Last90Days).await.unwrap();

        assert_eq!(report.batch_count, 1);
        assert_eq!(report.average_progress, 71.25);
        assert_eq!(report.course.title, "Systems Programming");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found_and_not_cached() {
        let source = seeded_source().await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);

        let err = service.batch(&BatchId::new(), TimeRange::Last30Days).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::BatchNotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = service.course(&CourseId::new(), TimeRange::Last30Days).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::CourseNotFound));

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_payment_collection_report() {
        let source = InMemoryAnalyticsSource::new();
        let now = Utc::now();
        for (amount, payment_type, days_ago) in [
            (60_000, PaymentType::Full, 2),
            (20_000, PaymentType::Emi, 3),
            (20_000, PaymentType::Emi, 4),
            (99_000, PaymentType::Full, 400),
        ] {
            source
                .add_payment(CompletedPayment {
                    amount,
                    payment_type,
                    paid_at: now - Duration::days(days_ago),
                })
                .await;
        }
        let service = service(&source, &InMemoryCacheRepository::new());

        let report = service.payment_collection(TimeRange::Last30Days).await.unwrap();

        assert_eq!(report.total_amount, 100_000);
        assert_eq!(report.total_count, 3);
        assert_eq!(report.by_type[0].percentage, 60.0);
        assert_eq!(report.by_type[1].count, 2);
        let months: i64 = report.by_month.iter().map(|b| b.count).sum();
        assert_eq!(months, 3);
    }

    #[tokio::test]
    async fn test_clear_cache_by_pattern() {
        let source = seeded_source().await;
        let (batch_id, _) = add_batch(&source).await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);

        service.system(TimeRange::Last30Days).await.unwrap();
        service.system(TimeRange::Last7Days).await.unwrap();
        service.batch(&batch_id, TimeRange::Last30Days).await.unwrap();

        let removed = service
            .clear_cache(&["^analytics:system:".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);

        let queries = source.query_count();
        service.system(TimeRange::Last30Days).await.unwrap();
        assert!(source.query_count() > queries);
    }

    #[tokio::test]
    async fn test_invalid_pattern_deletes_nothing() {
        let source = seeded_source().await;
        let cache = InMemoryCacheRepository::new();
        let service = service(&source, &cache);
        service.system(TimeRange::Last30Days).await.unwrap();

        let err = service
            .clear_cache(&["^analytics:".to_string(), "([".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyticsError::InvalidPattern(_)));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(cache.len().await, 1);
    }

    /// Cache backend whose every operation fails
    struct BrokenCache;

    impl CacheRepository for BrokenCache {
        async fn find(&self, _key: &str) -> CacheResult<Option<CacheEntry>> {
            Err(CacheError::Internal("store offline".to_string()))
        }

        async fn upsert(&self, _entry: &CacheEntry) -> CacheResult<()> {
            Err(CacheError::Internal("store offline".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<u64> {
            Err(CacheError::Internal("store offline".to_string()))
        }

        async fn delete_matching(&self, _pattern: &KeyPattern) -> CacheResult<u64> {
            Err(CacheError::Internal("store offline".to_string()))
        }

        async fn delete_expired(&self, _now: DateTime<Utc>) -> CacheResult<u64> {
            Err(CacheError::Internal("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_reports() {
        let source = seeded_source().await;
        let service = AnalyticsService::new(
            Arc::new(source.clone()),
            CacheService::new(Arc::new(BrokenCache), Arc::new(CacheConfig::default())),
            Arc::new(AnalyticsConfig::default()),
        );

        let first = service.system(TimeRange::Last30Days).await.unwrap();
        let queries = source.query_count();
        let second = service.system(TimeRange::Last30Days).await.unwrap();

        assert_eq!(first.overview, second.overview);
        assert!(source.query_count() > queries);
    }
}

#[cfg(test)]
mod router_tests {
    use crate::application::config::AnalyticsConfig;
    use crate::domain::entity::metrics::{BatchSummary, CourseSummary, OverviewCounts};
    use crate::domain::entity::report::SystemAnalytics;
    use crate::infra::memory::InMemoryAnalyticsSource;
    use crate::presentation::router::analytics_router_generic;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::{Extension, Router};
    use cache::{CacheConfig, CacheService, InMemoryCacheRepository};
    use chrono::Utc;
    use kernel::id::{BatchId, CourseId, UserId};
    use kernel::principal::{Principal, Role};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(role: Role) -> Router {
        let cache = CacheService::new(
            Arc::new(InMemoryCacheRepository::new()),
            Arc::new(CacheConfig::default()),
        );
        analytics_router_generic(InMemoryAnalyticsSource::new(), cache, AnalyticsConfig::default())
            .layer(Extension(Principal {
                user_id: UserId::new(),
                role,
                email: "caller@example.com".to_string(),
            }))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_system_report_is_admin_only() {
        let response = app(Role::Instructor).oneshot(get("/system")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(Role::Admin).oneshot(get("/system?range=7d")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_range_is_rejected() {
        let response = app(Role::Admin).oneshot(get("/system?range=2w")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_batch_is_not_found() {
        let uri = format!("/batches/{}", BatchId::new());
        let response = app(Role::Instructor).oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(Role::Student).oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_clear_cache_rejects_bad_pattern() {
        let request = Request::builder()
            .method("POST")
            .uri("/cache/clear")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"patterns":["(unclosed"]}"#))
            .unwrap();

        let response = app(Role::Admin).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_cache_serves_fresh_report_under_mount_path() {
        let source = InMemoryAnalyticsSource::new();
        source
            .set_overview(OverviewCounts {
                total_students: 40,
                ..OverviewCounts::default()
            })
            .await;
        let cache = CacheService::new(
            Arc::new(InMemoryCacheRepository::new()),
            Arc::new(CacheConfig::default()),
        );
        let app = Router::new().nest(
            "/api/analytics",
            analytics_router_generic(source.clone(), cache, AnalyticsConfig::default()).layer(
                Extension(Principal {
                    user_id: UserId::new(),
                    role: Role::Admin,
                    email: "admin@example.com".to_string(),
                }),
            ),
        );

        async fn students(app: &Router) -> i64 {
            let response = app
                .clone()
                .oneshot(get("/api/analytics/system?range=30d"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let report: SystemAnalytics = serde_json::from_slice(&bytes).unwrap();
            report.overview.total_students
        }

        assert_eq!(students(&app).await, 40);

        source
            .set_overview(OverviewCounts {
                total_students: 99,
                ..OverviewCounts::default()
            })
            .await;
        assert_eq!(students(&app).await, 40);

        let clear = Request::builder()
            .method("POST")
            .uri("/api/analytics/cache/clear")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"patterns":["^analytics:system:"]}"#))
            .unwrap();
        let response = app.clone().oneshot(clear).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(students(&app).await, 99);
    }

    #[tokio::test]
    async fn test_instructor_reads_only_taught_batches_and_courses() {
        let source = InMemoryAnalyticsSource::new();
        let (batch_id, course_id, instructor) = (BatchId::new(), CourseId::new(), UserId::new());
        source
            .add_course(CourseSummary {
                course_id,
                title: "Systems Programming".to_string(),
                is_published: true,
                created_at: Utc::now(),
            })
            .await;
        source
            .add_batch(BatchSummary {
                batch_id,
                course_id,
                course_title: "Systems Programming".to_string(),
                name: "Spring cohort".to_string(),
                status: "ongoing".to_string(),
                instructor_id: Some(instructor),
                start_date: None,
                end_date: None,
            })
            .await;

        let as_caller = |user_id: UserId, role: Role| {
            let cache = CacheService::new(
                Arc::new(InMemoryCacheRepository::new()),
                Arc::new(CacheConfig::default()),
            );
            analytics_router_generic(source.clone(), cache, AnalyticsConfig::default()).layer(
                Extension(Principal {
                    user_id,
                    role,
                    email: "caller@example.com".to_string(),
                }),
            )
        };

        for uri in [format!("/batches/{batch_id}"), format!("/courses/{course_id}")] {
            let response = as_caller(instructor, Role::Instructor)
                .oneshot(get(&uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let response = as_caller(UserId::new(), Role::Instructor)
                .oneshot(get(&uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            let response = as_caller(UserId::new(), Role::Admin)
                .oneshot(get(&uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
