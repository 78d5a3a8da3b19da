use anyhow::Context;
use axum::{Json, Router, routing::get};
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::races::handlers::list_races,
        features::races::handlers::get_race,
        features::races::handlers::create_race,
        features::races::handlers::list_checkpoints,
        features::races::handlers::create_checkpoint,
        features::participants::handlers::list_participants,
        features::participants::handlers::create_participant,
        features::participants::handlers::update_participant,
        features::participants::handlers::create_registration,
        features::participants::handlers::import_roster,
        features::participants::handlers::export_roster,
        features::timing::handlers::list_events,
        features::timing::handlers::record_event,
        features::timing::handlers::record_bulk_events,
        features::timing::handlers::update_event,
        features::timing::handlers::delete_event,
        features::timing::handlers::undo_delete_event,
        features::timing::handlers::recalculate_times,
        features::results::handlers::refresh_results,
        features::results::handlers::get_leaderboard,
        features::results::handlers::export_results,
        features::adjustments::handlers::adjust_time,
        features::adjustments::handlers::add_penalty,
        features::adjustments::handlers::disqualify,
        features::adjustments::handlers::reinstate,
        features::categories::handlers::assign_categories,
        features::categories::handlers::set_category,
        features::categories::handlers::recalculate_category_places,
        features::sessions::handlers::start_session,
        features::sessions::handlers::update_session,
        features::sessions::handlers::end_session,
        features::audit::handlers::race_history,
        features::audit::handlers::entity_history,
        features::analytics::handlers::race_statistics,
        features::analytics::handlers::checkpoint_statistics,
        features::analytics::handlers::participant_splits,
    ),
    components(
        schemas(
            storage::dto::race::CreateRaceRequest,
            storage::dto::race::RaceDetailResponse,
            storage::dto::checkpoint::CreateCheckpointRequest,
            storage::dto::participant::CreateParticipantRequest,
            storage::dto::participant::UpdateParticipantRequest,
            storage::dto::participant::CreateRegistrationRequest,
            storage::dto::timing::RecordTimingEventRequest,
            storage::dto::timing::BulkTimingEventItem,
            storage::dto::timing::RecordBulkTimingEventsRequest,
            storage::dto::timing::UpdateTimingEventRequest,
            storage::dto::results::LeaderboardEntry,
            storage::dto::adjustment::AdjustTimeRequest,
            storage::dto::adjustment::AddPenaltyRequest,
            storage::dto::adjustment::DisqualifyRequest,
            storage::dto::adjustment::ReinstateRequest,
            storage::dto::adjustment::SetCategoryRequest,
            storage::dto::session::StartSessionRequest,
            storage::dto::session::UpdateSessionRequest,
            storage::dto::audit::AuditEntryResponse,
            storage::dto::analytics::RaceStatistics,
            storage::dto::analytics::CheckpointStatistics,
            storage::dto::analytics::SplitTime,
            storage::models::Race,
            storage::models::Checkpoint,
            storage::models::Participant,
            storage::models::Registration,
            storage::models::TimingEvent,
            storage::models::ResultCacheEntry,
            storage::models::TimingSession,
            storage::models::AuditLogEntry,
            storage::models::AuditAction,
        )
    ),
    tags(
        (name = "races", description = "Race and checkpoint configuration"),
        (name = "participants", description = "Participants, registrations and roster transfer"),
        (name = "timing", description = "Timing event ingestion and corrections"),
        (name = "results", description = "Leaderboard computation and export"),
        (name = "adjustments", description = "Manual result corrections"),
        (name = "categories", description = "Age/gender category management"),
        (name = "sessions", description = "Timing device sessions"),
        (name = "audit", description = "Immutable change history"),
        (name = "analytics", description = "Race, checkpoint and split statistics"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn app(state: AppState, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .merge(features::races::routes::routes(api_keys.clone()))
        .merge(features::participants::routes::routes(api_keys.clone()))
        .merge(features::timing::routes::routes(api_keys.clone()))
        .merge(features::results::routes::routes(api_keys.clone()))
        .merge(features::adjustments::routes::routes(api_keys.clone()))
        .merge(features::categories::routes::routes(api_keys.clone()))
        .merge(features::sessions::routes::routes(api_keys))
        .merge(features::audit::routes::routes())
        .merge(features::analytics::routes::routes());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting race timing API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    let state = AppState::new(db);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "OpenAPI document available at http://{}/api-docs/openapi.json",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app(state, api_keys)).await?;

    Ok(())
}
