mod handlers;

use axum::{
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::service::RelationshipService;

/// Shared handler state.
pub type Registry = RelationshipService<Database>;

/// Router with a permissive CORS policy.
pub fn create_router(db: Database) -> Router {
    create_router_with_cors(db, CorsLayer::permissive())
}

pub fn create_router_with_cors(db: Database, cors: CorsLayer) -> Router {
    Router::new()
        .route(
            "/persons",
            get(handlers::list_persons).post(handlers::create_person),
        )
        .route(
            "/persons/{id}",
            get(handlers::get_person).delete(handlers::delete_person),
        )
        .route(
            "/persons/{id}/parents",
            put(handlers::add_parent).get(handlers::list_parents),
        )
        .route("/persons/{id}/children", get(handlers::list_children))
        .route("/persons/{id}/ancestry", get(handlers::get_ancestry))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Registry::new(db))
}
