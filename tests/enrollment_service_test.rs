use std::sync::Arc;

use pathshala::{
    auth::{AuthService, StaticRolePolicy},
    domain::{
        Course, CreateCourseRequest, CreateLessonRequest, CreateSectionRequest, CreateUserRequest,
        Lesson, User,
    },
    error::AppError,
    integrations::NoopSmsGateway,
    service::ServiceContext,
};
use sqlx::SqlitePool;

async fn setup() -> anyhow::Result<Arc<ServiceContext>> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let auth_service = Arc::new(AuthService::new(pool.clone()));
    let role_policy = Arc::new(StaticRolePolicy::default());

    Ok(Arc::new(ServiceContext::new(
        auth_service,
        role_policy,
        Arc::new(NoopSmsGateway),
        pool,
    )))
}

async fn create_user(ctx: &ServiceContext) -> anyhow::Result<User> {
    let user = ctx.user_repo.create(CreateUserRequest {
        email: format!("{}@example.com", uuid::Uuid::new_v4()),
        phone: None,
        full_name: "Test Student".to_string(),
        password_hash: "unused".to_string(),
    }).await?;

    Ok(user)
}

/// A published course with one section and two lessons.
async fn create_course_with_lessons(
    ctx: &ServiceContext,
    price: i64,
) -> anyhow::Result<(Course, Vec<Lesson>)> {
    let course = ctx.course_repo.create(CreateCourseRequest {
        title: "Course".to_string(),
        slug: format!("course-{}", uuid::Uuid::new_v4()),
        description: String::new(),
        category_id: None,
        teacher_id: None,
        price,
        thumbnail_url: None,
        intro_video_id: None,
        is_published: true,
    }).await?;

    let section = ctx.course_repo.create_section(course.id, CreateSectionRequest {
        title: "Section 1".to_string(),
        position: 0,
    }).await?;

    let mut lessons = Vec::new();
    for (i, title) in ["Lesson 1", "Lesson 2"].iter().enumerate() {
        lessons.push(
            ctx.course_repo.create_lesson(section.id, CreateLessonRequest {
                title: title.to_string(),
                video_id: "dQw4w9WgXcQ".to_string(),
                duration_minutes: 10,
                position: i as i64,
                is_preview: false,
            }).await?,
        );
    }

    Ok((course, lessons))
}

#[tokio::test]
async fn test_free_enrollment() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;
    let (course, _) = create_course_with_lessons(&ctx, 0).await?;

    let enrollment = ctx.enrollment_service.enroll_free(user.id, course.id).await?;
    assert_eq!(enrollment.progress_percentage, 0);

    let course = ctx.course_repo.find_by_id(course.id).await?.unwrap();
    assert_eq!(course.total_students, 1);

    Ok(())
}

#[tokio::test]
async fn test_free_enrollment_rejects_paid_courses() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;
    let (course, _) = create_course_with_lessons(&ctx, 2500).await?;

    let err = ctx.enrollment_service
        .enroll_free(user.id, course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_manual_enrollment_is_idempotent() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;
    let (course, _) = create_course_with_lessons(&ctx, 2500).await?;

    let first = ctx.enrollment_service.enroll_manual(user.id, course.id).await?;
    let second = ctx.enrollment_service.enroll_manual(user.id, course.id).await?;
    assert_eq!(first.id, second.id);

    // The counter only moved on the first insert
    let course = ctx.course_repo.find_by_id(course.id).await?.unwrap();
    assert_eq!(course.total_students, 1);

    Ok(())
}

#[tokio::test]
async fn test_lesson_completion_tracks_progress() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;
    let (course, lessons) = create_course_with_lessons(&ctx, 0).await?;

    ctx.enrollment_service.enroll_free(user.id, course.id).await?;

    let after_first = ctx.enrollment_service
        .complete_lesson(user.id, lessons[0].id)
        .await?;
    assert_eq!(after_first.progress_percentage, 50);
    assert!(after_first.completed_at.is_none());

    // Watching the same lesson again moves nothing
    let repeated = ctx.enrollment_service
        .complete_lesson(user.id, lessons[0].id)
        .await?;
    assert_eq!(repeated.progress_percentage, 50);

    let after_second = ctx.enrollment_service
        .complete_lesson(user.id, lessons[1].id)
        .await?;
    assert_eq!(after_second.progress_percentage, 100);
    assert!(after_second.completed_at.is_some());

    Ok(())
}

#[tokio::test]
async fn test_lesson_completion_requires_enrollment() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;
    let (_, lessons) = create_course_with_lessons(&ctx, 0).await?;

    let err = ctx.enrollment_service
        .complete_lesson(user.id, lessons[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn test_completing_unknown_lesson_is_not_found() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;

    let err = ctx.enrollment_service
        .complete_lesson(user.id, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}
