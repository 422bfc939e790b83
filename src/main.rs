mod appointments;
mod auth;
mod db;
mod doctors;
mod error;
mod patients;
mod reports;
mod validation;
mod wallet;

use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use appointments::BookingService;
use auth::TokenService;
use doctors::models::{DoctorResponse, RegisterDoctorRequest, UpdateDoctorRequest};
use doctors::DoctorsRepository;
use patients::PatientsRepository;
use reports::ReportsRepository;
use wallet::WalletLedger;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        doctors::handlers::register_doctor,
        doctors::handlers::list_doctors,
        doctors::handlers::get_doctor,
        doctors::handlers::update_doctor,
        doctors::handlers::delete_doctor,
    ),
    components(
        schemas(DoctorResponse, RegisterDoctorRequest, UpdateDoctorRequest)
    ),
    tags(
        (name = "doctors", description = "Doctor management endpoints")
    ),
    info(
        title = "Clinic Booking API",
        version = "1.0.0",
        description = "RESTful API for clinic appointments, wallets and reports"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub booking_service: BookingService,
    pub wallet_ledger: WalletLedger,
    pub patients_repo: PatientsRepository,
    pub doctors_repo: DoctorsRepository,
    pub reports_repo: ReportsRepository,
    pub token_service: TokenService,
}

impl AppState {
    pub fn new(db: PgPool, jwt_secret: String) -> Self {
        Self {
            booking_service: BookingService::new(db.clone()),
            wallet_ledger: WalletLedger::new(db.clone()),
            patients_repo: PatientsRepository::new(db.clone()),
            doctors_repo: DoctorsRepository::new(db.clone()),
            reports_repo: ReportsRepository::new(db.clone()),
            token_service: TokenService::new(jwt_secret),
            db,
        }
    }
}

/// Handler for GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        // Patients
        .route("/api/patients/register", post(patients::handlers::register_patient))
        .route("/api/patients/login", post(patients::handlers::login_patient))
        .route("/api/patients", get(patients::handlers::list_patients))
        .route("/api/patients/:id", get(patients::handlers::get_patient))
        .route("/api/patients/:id", put(patients::handlers::update_patient))
        .route("/api/patients/:id", delete(patients::handlers::delete_patient))
        // Doctors
        .route("/api/doctors/register", post(doctors::handlers::register_doctor))
        .route("/api/doctors/login", post(doctors::handlers::login_doctor))
        .route("/api/doctors", get(doctors::handlers::list_doctors))
        .route("/api/doctors/:id", get(doctors::handlers::get_doctor))
        .route("/api/doctors/:id", put(doctors::handlers::update_doctor))
        .route("/api/doctors/:id", delete(doctors::handlers::delete_doctor))
        // Appointments
        .route("/api/appointments/book", post(appointments::handlers::book_appointment))
        .route("/api/appointments", get(appointments::handlers::list_appointments))
        .route("/api/appointments/:id", get(appointments::handlers::get_appointment))
        .route(
            "/api/appointments/:id/status",
            patch(appointments::handlers::update_appointment_status),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(appointments::handlers::cancel_appointment),
        )
        .route("/api/appointments/:id", delete(appointments::handlers::delete_appointment))
        // Wallets
        .route("/api/wallets/credit", post(wallet::handlers::credit_wallet))
        .route("/api/wallets/debit", post(wallet::handlers::debit_wallet))
        .route(
            "/api/wallets/:patient_id/balance",
            get(wallet::handlers::get_balance),
        )
        .route(
            "/api/wallets/:patient_id/transactions",
            get(wallet::handlers::list_transactions),
        )
        // Reports
        .route("/api/reports", post(reports::handlers::create_report))
        .route("/api/reports/:id", get(reports::handlers::get_report))
        .route(
            "/api/reports/patient/:patient_id",
            get(reports::handlers::list_patient_reports),
        )
        .route(
            "/api/reports/earnings/:doctor_id",
            get(reports::handlers::doctor_earnings),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    use tower_governor::governor::GovernorConfigBuilder;
    use tower_governor::GovernorLayer;

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Clinic Booking API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Per-client rate limiting, keyed by peer address
    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(50)
            .finish()
            .expect("Invalid rate limiter configuration"),
    );

    let app = create_router(AppState::new(db_pool, jwt_secret)).layer(GovernorLayer {
        config: Box::leak(governor_conf),
    });

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Clinic Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("Server error");
}

#[cfg(test)]
mod tests;
