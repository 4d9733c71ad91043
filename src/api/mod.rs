pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Settings, integrations::YouTubeClient, service::ServiceContext};
use state::AppState;

/// Public API surface documented at /api/docs. Authenticated dashboard
/// and admin routes are first-party only and left out.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::courses::list,
        handlers::courses::get,
        handlers::catalog::list_categories,
        handlers::catalog::list_teachers,
        handlers::catalog::list_testimonials,
        handlers::coupons::validate,
        handlers::payments::submit,
        handlers::payments::methods,
        handlers::otp::send,
        handlers::otp::verify,
        handlers::videos::info,
    ),
    components(schemas(
        crate::domain::Course,
        crate::domain::Category,
        crate::domain::Teacher,
        crate::domain::Testimonial,
        crate::domain::CouponCode,
        crate::domain::CouponDiscount,
        crate::domain::DiscountType,
        crate::domain::PaymentMethod,
        crate::domain::BillingInfo,
        handlers::courses::CourseSummary,
        handlers::courses::CourseDetail,
        handlers::courses::SectionView,
        handlers::courses::LessonView,
        handlers::coupons::ValidateCouponRequest,
        handlers::payments::SubmitPaymentDto,
        handlers::payments::SubmitPaymentResponse,
        handlers::otp::SendOtpRequest,
        handlers::otp::VerifyOtpRequest,
        handlers::otp::OtpResponse,
        handlers::videos::VideoInfoRequest,
        crate::integrations::VideoInfo,
    )),
    info(
        title = "Pathshala API",
        description = "E-learning marketplace: catalog, checkout, and phone verification"
    )
)]
struct ApiDoc;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    youtube_client: Option<Arc<YouTubeClient>>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, youtube_client, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // API routes
        .nest("/api", api_routes(app_state.clone()))
        // OpenAPI docs for the public surface
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Checkout and OTP are called cross-origin
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public catalog
        .route("/courses", get(handlers::courses::list))
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/teachers", get(handlers::catalog::list_teachers))
        .route("/testimonials", get(handlers::catalog::list_testimonials))
        .route("/coupons/validate", post(handlers::coupons::validate))
        .route("/payments/methods", get(handlers::payments::methods))
        .route("/otp/send", post(handlers::otp::send))
        .route("/otp/verify", post(handlers::otp::verify))
        .route("/videos/info", post(handlers::videos::info))
        // Guest-friendly routes: auth attaches when present
        .merge(Router::new()
            .route("/courses/:id", get(handlers::courses::get))
            .route("/payments", post(handlers::payments::submit))
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth::optional_auth,
            ))
        )
        // Student dashboard routes
        .merge(Router::new()
            .route("/me", get(handlers::auth::me))
            .route("/me/enrollments", get(handlers::enrollments::my_enrollments))
            .route("/me/payments", get(handlers::payments::my_payments))
            .route("/me/notifications", get(handlers::notifications::list))
            .route("/me/notifications/:id/read", post(handlers::notifications::mark_read))
            .route("/courses/:id/enroll", post(handlers::enrollments::enroll_free))
            .route("/lessons/:id/complete", post(handlers::enrollments::complete_lesson))
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth::require_auth,
            ))
        )
        // Admin back-office
        .nest("/admin", admin_routes(state))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        // Payment review queue
        .route("/payments", get(handlers::payments::admin_list))
        .route("/payments/verify", post(handlers::payments::verify))
        .route("/payments/:id", get(handlers::payments::admin_get))
        // Enrollment management
        .route("/enrollments", post(handlers::enrollments::admin_enroll))
        .route("/courses/:id/enrollments", get(handlers::enrollments::admin_list_by_course))
        // Course management
        .route("/courses", get(handlers::courses::admin_list))
        .route("/courses", post(handlers::courses::create))
        .route("/courses/:id", put(handlers::courses::update))
        .route("/courses/:id", delete(handlers::courses::delete))
        .route("/courses/:id/sections", get(handlers::courses::list_sections))
        .route("/courses/:id/sections", post(handlers::courses::create_section))
        .route("/sections/:id", put(handlers::courses::update_section))
        .route("/sections/:id", delete(handlers::courses::delete_section))
        .route("/sections/:id/lessons", post(handlers::courses::create_lesson))
        .route("/lessons/:id", put(handlers::courses::update_lesson))
        .route("/lessons/:id", delete(handlers::courses::delete_lesson))
        // Reference data
        .route("/categories", post(handlers::catalog::create_category))
        .route("/categories/:id", delete(handlers::catalog::delete_category))
        .route("/teachers", post(handlers::catalog::create_teacher))
        .route("/teachers/:id", put(handlers::catalog::update_teacher))
        .route("/teachers/:id", delete(handlers::catalog::delete_teacher))
        .route("/testimonials", get(handlers::catalog::admin_list_testimonials))
        .route("/testimonials", post(handlers::catalog::create_testimonial))
        .route("/testimonials/:id", delete(handlers::catalog::delete_testimonial))
        // Coupon management
        .route("/coupons", get(handlers::coupons::list))
        .route("/coupons", post(handlers::coupons::create))
        .route("/coupons/:id", put(handlers::coupons::update))
        .route("/coupons/:id", delete(handlers::coupons::delete))
        // Messaging
        .route("/sms/send", post(handlers::sms::send))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
