use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use desk_core::Desk;
use desk_types::{LookupKind, LookupPatch};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState, NewLookup};

/// Build the axum router with all Desk endpoints.
pub fn build_router(desk: Arc<Desk>, cors: bool) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(handler::health))
        .route(
            "/api/tickets",
            get(handler::list_tickets).post(handler::create_ticket),
        )
        .route(
            "/api/tickets/:id",
            get(handler::get_ticket)
                .put(handler::update_ticket)
                .delete(handler::delete_ticket),
        )
        .route("/api/tickets/:id/comments", post(handler::add_comment))
        .route(
            "/api/tickets/:id/comments/:comment_id",
            axum::routing::delete(handler::delete_comment),
        )
        .merge(lookup_routes(LookupKind::Status))
        .merge(lookup_routes(LookupKind::Category))
        .layer(TraceLayer::new_for_http())
        .with_state(desk);

    if cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// `/api/statuses` or `/api/categories`, depending on `kind`.
fn lookup_routes(kind: LookupKind) -> Router<AppState> {
    let collection = format!("/api/{}", kind.collection_name());
    let entry = format!("{collection}/:key");

    Router::new()
        .route(
            &collection,
            get(move |State(desk): State<AppState>| handler::list_lookups(desk, kind)).post(
                move |State(desk): State<AppState>,
                      payload: Result<Json<NewLookup>, JsonRejection>| {
                    handler::create_lookup(desk, kind, payload)
                },
            ),
        )
        .route(
            &entry,
            get(
                move |State(desk): State<AppState>, Path(key): Path<String>| {
                    handler::get_lookup(desk, kind, key)
                },
            )
            .put(
                move |State(desk): State<AppState>,
                      Path(key): Path<String>,
                      payload: Result<Json<LookupPatch>, JsonRejection>| {
                    handler::update_lookup(desk, kind, key, payload)
                },
            )
            .delete(
                move |State(desk): State<AppState>, Path(key): Path<String>| {
                    handler::delete_lookup(desk, kind, key)
                },
            ),
        )
}
