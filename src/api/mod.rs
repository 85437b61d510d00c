pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))

        .nest("/auth", auth_routes(app_state.clone()))
        .nest("/api", api_routes(app_state.clone()))
        .nest("/admin", admin_routes(app_state.clone()))

        .with_state(app_state)

        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/password", put(handlers::auth::change_password))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile::get).put(handlers::profile::update))
        .nest("/applications", application_routes())
        .route("/rooms/available", get(handlers::rooms::available))
        .route("/blocks", get(handlers::rooms::list_blocks))
        .route("/blocks/:id", get(handlers::rooms::get_block))
        .nest("/maintenance", maintenance_routes())
        .route("/announcements", get(handlers::announcements::visible))
        .nest("/notifications", notification_routes())
        .nest("/messages", message_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::applications::list_mine).post(handlers::applications::submit))
        .route("/eligible-blocks", get(handlers::applications::eligible_blocks))
        .route(
            "/:id",
            get(handlers::applications::get)
                .put(handlers::applications::update)
                .delete(handlers::applications::withdraw),
        )
}

fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::maintenance::list_mine).post(handlers::maintenance::submit))
        .route("/:id", get(handlers::maintenance::get))
        .route("/:id/cancel", post(handlers::maintenance::cancel))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::notifications::list))
        .route("/unread-count", get(handlers::notifications::unread_count))
        .route("/read-all", post(handlers::notifications::mark_all_read))
        .route("/:id/read", post(handlers::notifications::mark_read))
        .route("/:id", axum::routing::delete(handlers::notifications::delete))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::messages::conversations).post(handlers::messages::send))
        .route("/unread-count", get(handlers::messages::unread_count))
        .route("/with/:user_id", get(handlers::messages::conversation))
        .route("/:id/read", post(handlers::messages::mark_read))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        .nest("/applications", admin_application_routes())
        .nest("/blocks", admin_block_routes())
        .nest("/rooms", admin_room_routes())
        .route("/assignments", get(handlers::admin::list_assignments))
        .route("/assignments/:id", get(handlers::admin::get_assignment))
        .route("/assignments/:id/check-out", post(handlers::admin::check_out))
        .nest("/maintenance", admin_maintenance_routes())
        .nest("/announcements", admin_announcement_routes())
        .nest("/students", admin_student_routes())
        .route("/reports", get(handlers::reports::list_kinds))
        .route("/reports/:kind", get(handlers::reports::generate))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

fn admin_application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::admin::list_applications))
        .route("/counts", get(handlers::admin::application_counts))
        .route("/:id", get(handlers::admin::get_application))
        .route("/:id/approve", post(handlers::admin::approve_application))
        .route("/:id/deny", post(handlers::admin::deny_application))
}

fn admin_block_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::admin::list_blocks).post(handlers::admin::create_block))
        .route(
            "/:id",
            get(handlers::admin::get_block)
                .put(handlers::admin::update_block)
                .delete(handlers::admin::delete_block),
        )
}

fn admin_room_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::admin::list_rooms).post(handlers::admin::create_room))
        .route(
            "/:id",
            get(handlers::admin::get_room)
                .put(handlers::admin::update_room)
                .delete(handlers::admin::delete_room),
        )
        .route("/:id/status", put(handlers::admin::set_room_status))
}

fn admin_maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::admin::list_maintenance))
        .route(
            "/:id",
            get(handlers::admin::get_maintenance).delete(handlers::admin::delete_maintenance),
        )
        .route("/:id/status", put(handlers::admin::update_maintenance_status))
}

fn admin_announcement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::admin::list_announcements).post(handlers::admin::create_announcement),
        )
        .route(
            "/:id",
            get(handlers::admin::get_announcement)
                .put(handlers::admin::update_announcement)
                .delete(handlers::admin::delete_announcement),
        )
        .route("/:id/publish", post(handlers::admin::publish_announcement))
        .route("/:id/archive", post(handlers::admin::archive_announcement))
}

fn admin_student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::admin::list_students))
        .route("/:id", get(handlers::admin::get_student))
        .route("/:id/deactivate", post(handlers::admin::deactivate_student))
        .route("/:id/reactivate", post(handlers::admin::reactivate_student))
}
