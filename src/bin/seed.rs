use clap::Parser;
use fake::{faker::internet::en::SafeEmail, faker::name::en::Name, Fake};
use sqlx::sqlite::SqlitePoolOptions;

use pathshala::{
    auth::{AuthService, SqliteRolePolicy},
    domain::{
        CreateCategoryRequest, CreateCouponRequest, CreateCourseRequest, CreateLessonRequest,
        CreateSectionRequest, CreateTeacherRequest, CreateTestimonialRequest, CreateUserRequest,
        DiscountType, Role,
    },
    repository::{
        CategoryRepository, CouponRepository, CourseRepository, EnrollmentRepository,
        SqliteCategoryRepository, SqliteCouponRepository, SqliteCourseRepository,
        SqliteEnrollmentRepository, SqliteTeacherRepository, SqliteTestimonialRepository,
        SqliteUserRepository, TeacherRepository, TestimonialRepository, UserRepository,
    },
};

#[derive(Parser)]
#[command(about = "Seed the Pathshala database with demo data")]
struct Args {
    /// Number of demo student accounts to create
    #[arg(long, default_value_t = 5)]
    students: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:pathshala.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let course_repo = SqliteCourseRepository::new(db_pool.clone());
    let category_repo = SqliteCategoryRepository::new(db_pool.clone());
    let teacher_repo = SqliteTeacherRepository::new(db_pool.clone());
    let testimonial_repo = SqliteTestimonialRepository::new(db_pool.clone());
    let coupon_repo = SqliteCouponRepository::new(db_pool.clone());
    let enrollment_repo = SqliteEnrollmentRepository::new(db_pool.clone());
    let role_policy = SqliteRolePolicy::new(db_pool.clone());

    println!("👤 Creating admin account...");

    let admin = user_repo.create(CreateUserRequest {
        email: "admin@pathshala.local".to_string(),
        phone: Some("01700000000".to_string()),
        full_name: "Admin".to_string(),
        password_hash: AuthService::hash_password("admin123").await?,
    }).await?;
    role_policy.grant(admin.id, Role::Admin).await?;

    println!("  ✅ Created admin (admin@pathshala.local / admin123)");

    println!("📚 Creating catalog...");

    let web_dev = category_repo.create(CreateCategoryRequest {
        name: "Web Development".to_string(),
        slug: "web-development".to_string(),
    }).await?;

    let language = category_repo.create(CreateCategoryRequest {
        name: "Language Learning".to_string(),
        slug: "language-learning".to_string(),
    }).await?;

    let rahim = teacher_repo.create(CreateTeacherRequest {
        full_name: "Rahim Uddin".to_string(),
        title: Some("Senior Software Engineer".to_string()),
        bio: Some("Ten years building web platforms; teaches practical full-stack development.".to_string()),
        avatar_url: None,
    }).await?;

    let nusrat = teacher_repo.create(CreateTeacherRequest {
        full_name: "Nusrat Jahan".to_string(),
        title: Some("IELTS Instructor".to_string()),
        bio: Some("Band 8.5 holder, coaching IELTS candidates since 2018.".to_string()),
        avatar_url: None,
    }).await?;

    let web_course = course_repo.create(CreateCourseRequest {
        title: "Full-Stack Web Development".to_string(),
        slug: "full-stack-web-development".to_string(),
        description: "HTML to deployment: build and ship three real projects.".to_string(),
        category_id: Some(web_dev.id),
        teacher_id: Some(rahim.id),
        price: 4500,
        thumbnail_url: None,
        intro_video_id: Some("dQw4w9WgXcQ".to_string()),
        is_published: true,
    }).await?;

    let basics = course_repo.create_section(web_course.id, CreateSectionRequest {
        title: "Getting Started".to_string(),
        position: 0,
    }).await?;

    course_repo.create_lesson(basics.id, CreateLessonRequest {
        title: "Course Introduction".to_string(),
        video_id: "dQw4w9WgXcQ".to_string(),
        duration_minutes: 8,
        position: 0,
        is_preview: true,
    }).await?;

    course_repo.create_lesson(basics.id, CreateLessonRequest {
        title: "Setting Up Your Environment".to_string(),
        video_id: "oHg5SJYRHA0".to_string(),
        duration_minutes: 22,
        position: 1,
        is_preview: false,
    }).await?;

    let ielts_course = course_repo.create(CreateCourseRequest {
        title: "IELTS Preparation Bootcamp".to_string(),
        slug: "ielts-preparation-bootcamp".to_string(),
        description: "Eight weeks of structured practice for all four bands.".to_string(),
        category_id: Some(language.id),
        teacher_id: Some(nusrat.id),
        price: 3000,
        thumbnail_url: None,
        intro_video_id: None,
        is_published: true,
    }).await?;

    let free_course = course_repo.create(CreateCourseRequest {
        title: "Freelancing 101".to_string(),
        slug: "freelancing-101".to_string(),
        description: "A free starter course on finding your first clients.".to_string(),
        category_id: Some(web_dev.id),
        teacher_id: Some(rahim.id),
        price: 0,
        thumbnail_url: None,
        intro_video_id: None,
        is_published: true,
    }).await?;

    println!("  ✅ Created 2 categories, 2 teachers, 3 courses");

    println!("🎟️  Creating coupons...");

    coupon_repo.create(CreateCouponRequest {
        code: "LAUNCH50".to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: 50,
        max_uses: Some(100),
        min_purchase_amount: 1000,
        valid_from: None,
        valid_until: Some(chrono::Utc::now() + chrono::Duration::days(30)),
        is_active: true,
        course_id: None,
    }).await?;

    coupon_repo.create(CreateCouponRequest {
        code: "IELTS500".to_string(),
        discount_type: DiscountType::Fixed,
        discount_value: 500,
        max_uses: None,
        min_purchase_amount: 0,
        valid_from: None,
        valid_until: None,
        is_active: true,
        course_id: Some(ielts_course.id),
    }).await?;

    println!("  ✅ Created 2 coupons (LAUNCH50, IELTS500)");

    println!("🧑‍🎓 Creating {} demo students...", args.students);

    for i in 0..args.students {
        let full_name: String = Name().fake();
        let email: String = SafeEmail().fake();

        let student = user_repo.create(CreateUserRequest {
            email: format!("{}.{}", i, email),
            phone: Some(format!("017{:08}", i + 1)),
            full_name,
            password_hash: AuthService::hash_password("password123").await?,
        }).await?;

        // First student gets an enrollment so the dashboard has content
        if i == 0 {
            let _ = enrollment_repo.create(student.id, free_course.id).await?;
            course_repo.increment_students(free_course.id).await?;
        }
    }

    println!("  ✅ Created {} students (password123)", args.students);

    println!("💬 Creating testimonials...");

    testimonial_repo.create(CreateTestimonialRequest {
        student_name: "Tanvir Ahmed".to_string(),
        content: "The web development course got me my first freelance client within two months.".to_string(),
        rating: 5,
        avatar_url: None,
        is_published: true,
    }).await?;

    testimonial_repo.create(CreateTestimonialRequest {
        student_name: "Sumaiya Akter".to_string(),
        content: "Scored band 7.5 after the IELTS bootcamp. The mock tests were the closest to the real thing.".to_string(),
        rating: 5,
        avatar_url: None,
        is_published: true,
    }).await?;

    println!("  ✅ Created 2 testimonials");

    println!("\n✨ Database seeding complete!");
    println!("\n📝 Test credentials:");
    println!("  Admin: admin@pathshala.local / admin123");
    println!("  Students: password123");

    Ok(())
}
