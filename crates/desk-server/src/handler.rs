use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Json;
use desk_core::{Desk, DeskResult};
use desk_types::{
    Comment, LookupEntry, LookupKind, LookupPatch, Ticket, TicketFields, TicketId, TicketPatch,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
pub type AppState = Arc<Desk>;

/// Body of `POST /api/statuses` and `POST /api/categories`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewLookup {
    pub label: String,
}

/// Body of `POST /api/tickets/:id/comments`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewComment {
    pub author: String,
    pub content: String,
}

/// Run a core operation on the blocking pool; the store does file I/O under
/// its lock.
async fn blocking<T, F>(desk: AppState, op: F) -> ServerResult<Json<T>>
where
    F: FnOnce(&Desk) -> DeskResult<T> + Send + 'static,
    T: Send + 'static,
{
    let value = tokio::task::spawn_blocking(move || op(&desk))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;
    Ok(Json(value))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

fn path<T>(params: Result<Path<T>, PathRejection>) -> ServerResult<T> {
    params
        .map(|Path(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

/// Health check handler.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "desk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---- Tickets ----

pub async fn list_tickets(State(desk): State<AppState>) -> ServerResult<Json<Vec<Ticket>>> {
    blocking(desk, |d| d.tickets().list_all()).await
}

pub async fn create_ticket(
    State(desk): State<AppState>,
    payload: Result<Json<TicketFields>, JsonRejection>,
) -> ServerResult<Json<Ticket>> {
    let fields = body(payload)?;
    blocking(desk, move |d| d.tickets().create(fields)).await
}

pub async fn get_ticket(
    State(desk): State<AppState>,
    id: Result<Path<TicketId>, PathRejection>,
) -> ServerResult<Json<Ticket>> {
    let id = path(id)?;
    blocking(desk, move |d| d.tickets().get_one(id)).await
}

pub async fn update_ticket(
    State(desk): State<AppState>,
    id: Result<Path<TicketId>, PathRejection>,
    payload: Result<Json<TicketPatch>, JsonRejection>,
) -> ServerResult<Json<Ticket>> {
    let id = path(id)?;
    let patch = body(payload)?;
    blocking(desk, move |d| d.tickets().update(id, patch)).await
}

pub async fn delete_ticket(
    State(desk): State<AppState>,
    id: Result<Path<TicketId>, PathRejection>,
) -> ServerResult<Json<Ticket>> {
    let id = path(id)?;
    blocking(desk, move |d| d.tickets().delete(id)).await
}

pub async fn add_comment(
    State(desk): State<AppState>,
    id: Result<Path<TicketId>, PathRejection>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> ServerResult<Json<Comment>> {
    let id = path(id)?;
    let comment = body(payload)?;
    blocking(desk, move |d| {
        d.tickets().add_comment(id, &comment.author, &comment.content)
    })
    .await
}

pub async fn delete_comment(
    State(desk): State<AppState>,
    params: Result<Path<(TicketId, String)>, PathRejection>,
) -> ServerResult<Json<Comment>> {
    let (id, comment_id) = path(params)?;
    blocking(desk, move |d| d.tickets().delete_comment(id, &comment_id)).await
}

// ---- Statuses and categories ----

pub async fn list_lookups(
    desk: AppState,
    kind: LookupKind,
) -> ServerResult<Json<Vec<LookupEntry>>> {
    blocking(desk, move |d| d.lookups(kind).list()).await
}

pub async fn create_lookup(
    desk: AppState,
    kind: LookupKind,
    payload: Result<Json<NewLookup>, JsonRejection>,
) -> ServerResult<Json<LookupEntry>> {
    let new = body(payload)?;
    blocking(desk, move |d| d.lookups(kind).create(&new.label)).await
}

pub async fn get_lookup(
    desk: AppState,
    kind: LookupKind,
    key: String,
) -> ServerResult<Json<LookupEntry>> {
    blocking(desk, move |d| d.lookups(kind).get(&key)).await
}

pub async fn update_lookup(
    desk: AppState,
    kind: LookupKind,
    key: String,
    payload: Result<Json<LookupPatch>, JsonRejection>,
) -> ServerResult<Json<LookupEntry>> {
    let patch = body(payload)?;
    blocking(desk, move |d| d.lookups(kind).update(&key, patch)).await
}

pub async fn delete_lookup(
    desk: AppState,
    kind: LookupKind,
    key: String,
) -> ServerResult<Json<LookupEntry>> {
    blocking(desk, move |d| d.lookups(kind).delete(&key)).await
}
