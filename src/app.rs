use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{CredentialVerifier, OwnershipAuthorizer, SessionTokenCodec};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{session_gate, ApiResponse, ApiResult};
use crate::services::{
    AlertService, EmergencyProfileService, MedicalRecordService, PetService, ResourceService,
    ScheduledTaskService, TreatmentPlanService, UserService, WellnessTimelineService,
};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<SessionTokenCodec>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub store: Arc<dyn DocumentStore>,
    pub ownership: OwnershipAuthorizer,
    pub users: UserService,
    pub pets: PetService,
    pub medical_records: MedicalRecordService,
    pub emergency_profiles: EmergencyProfileService,
    pub tasks: ScheduledTaskService,
    pub plans: TreatmentPlanService,
    pub resources: ResourceService,
    pub alerts: AlertService,
    pub timeline: WellnessTimelineService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        tokens: SessionTokenCodec,
        verifier: Arc<dyn CredentialVerifier>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let pets = PetService::new(store.clone());
        let tasks = ScheduledTaskService::new(store.clone());
        let plans = TreatmentPlanService::new(store.clone());
        let medical_records = MedicalRecordService::new(store.clone());
        let timeline = WellnessTimelineService::new(
            tasks.clone(),
            medical_records.clone(),
            plans.clone(),
            config.timeline.upcoming_limit,
        );

        Self {
            ownership: OwnershipAuthorizer::new(pets.clone()),
            users: UserService::new(store.clone()),
            emergency_profiles: EmergencyProfileService::new(store.clone()),
            resources: ResourceService::new(store.clone()),
            alerts: AlertService::new(store.clone()),
            pets,
            tasks,
            plans,
            medical_records,
            timeline,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            verifier,
            store,
        }
    }
}

/// Build the full router: public routes, protected routes, and the global layers.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);
    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        // Public
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(user_routes())
        .merge(pet_routes())
        .merge(medical_record_routes())
        .merge(emergency_profile_routes())
        .merge(scheduled_task_routes())
        .merge(treatment_plan_routes())
        .merge(alert_routes())
        .merge(resource_routes())
        .merge(timeline_routes())
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/google-auth", post(auth::google_auth_post))
        .route("/api/auth/logout", post(auth::logout_post))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", post(users::create))
        .route("/api/users/profile", put(users::update_profile))
        .route(
            "/api/users/:user_id",
            get(users::get).put(users::update).delete(users::delete),
        )
}

fn pet_routes() -> Router<AppState> {
    use protected::pets;

    Router::new()
        .route("/api/users/:user_id/pets", get(pets::list).post(pets::create))
        .route(
            "/api/users/:user_id/pets/:pet_id",
            get(pets::get).put(pets::update).delete(pets::delete),
        )
}

fn medical_record_routes() -> Router<AppState> {
    use protected::medical_records as records;

    Router::new()
        .route(
            "/api/users/:user_id/pets/:pet_id/medicalRecords",
            get(records::list).post(records::create),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/medicalRecords/:record_id",
            get(records::get).put(records::update).delete(records::delete),
        )
}

fn emergency_profile_routes() -> Router<AppState> {
    use protected::emergency_profile as profile;

    Router::new().route(
        "/api/users/:user_id/pets/:pet_id/emergencyProfile",
        get(profile::get)
            .post(profile::create)
            .put(profile::update)
            .delete(profile::delete),
    )
}

fn scheduled_task_routes() -> Router<AppState> {
    use protected::scheduled_tasks as tasks;

    Router::new()
        .route(
            "/api/users/:user_id/pets/:pet_id/scheduledTasks",
            get(tasks::list).post(tasks::create),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/scheduledTasks/upcoming",
            get(tasks::upcoming),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/scheduledTasks/:task_id",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/scheduledTasks/:task_id/status",
            patch(tasks::update_status),
        )
}

fn timeline_routes() -> Router<AppState> {
    Router::new().route(
        "/api/users/:user_id/pets/:pet_id/wellnessTimeline",
        get(protected::wellness_timeline::get),
    )
}

fn treatment_plan_routes() -> Router<AppState> {
    use protected::treatment_plans as plans;

    Router::new()
        .route(
            "/api/users/:user_id/pets/:pet_id/treatmentPlans",
            get(plans::list).post(plans::create),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/treatmentPlans/:plan_id",
            get(plans::get).put(plans::update).delete(plans::delete),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/treatmentPlans/:plan_id/progress",
            patch(plans::update_progress),
        )
}

fn alert_routes() -> Router<AppState> {
    use protected::alerts;

    Router::new()
        .route(
            "/api/users/:user_id/pets/:pet_id/alerts",
            get(alerts::list).post(alerts::create),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/alerts/:alert_id",
            get(alerts::get).delete(alerts::delete),
        )
        .route(
            "/api/users/:user_id/pets/:pet_id/alerts/:alert_id/read",
            patch(alerts::mark_read),
        )
}

fn resource_routes() -> Router<AppState> {
    use protected::resources;

    Router::new()
        .route(
            "/api/users/:user_id/resources",
            get(resources::list).post(resources::create),
        )
        .route(
            "/api/users/:user_id/resources/:resource_id",
            get(resources::get)
                .put(resources::update)
                .delete(resources::delete),
        )
}

async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "store": "ok"
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Document store unavailable"))
        }
    }
}
