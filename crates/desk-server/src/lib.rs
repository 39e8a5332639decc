//! HTTP server for Desk.
//!
//! Exposes tickets, statuses, and categories as a JSON REST API under
//! `/api`. Core errors map onto status codes in [`ServerError`].

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::DeskServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use desk_core::Desk;
    use desk_store::{InMemoryBackend, Store};
    use desk_types::SystemClock;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> (Arc<InMemoryBackend>, Router) {
        let backend = Arc::new(InMemoryBackend::new());
        let desk = Desk::new(Arc::new(Store::new(backend.clone())), Arc::new(SystemClock));
        (backend, build_router(Arc::new(desk), true))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn ticket_body(status: Value, category: Value) -> Value {
        json!({
            "user": "A", "title": "T1", "description": "D",
            "priority": "high", "status": status, "category": category
        })
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (_, app) = app();
        let (status, body) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn ticket_crud() {
        let (_, app) = app();

        let (status, created) =
            send(&app, "POST", "/api/tickets", Some(ticket_body(Value::Null, Value::Null))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["comments"], json!([]));
        assert!(created["createdAt"].is_string());

        let (status, updated) = send(
            &app,
            "PUT",
            "/api/tickets/1",
            Some(json!({"title": "T1b", "id": 77})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "T1b");
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let (status, listed) = send(&app, "GET", "/api/tickets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", "/api/tickets/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "GET", "/api/tickets/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "ticket not found: 1");
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let (_, app) = app();
        let (status, body) = send(&app, "POST", "/api/tickets", Some(json!({"title": "T"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "missing required fields: user, description, priority, status, category"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (_, app) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/tickets")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unparsable_ticket_id_is_json_bad_request() {
        let (_, app) = app();
        for (method, uri) in [
            ("GET", "/api/tickets/abc"),
            ("DELETE", "/api/tickets/-1"),
            ("DELETE", "/api/tickets/abc/comments/c1"),
        ] {
            let (status, body) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            let message = body["error"].as_str().unwrap();
            assert!(message.starts_with("invalid request: "), "{message}");
        }

        let (status, body) =
            send(&app, "PUT", "/api/tickets/abc", Some(json!({"title": "T"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn status_delete_cascades_to_tickets() {
        let (_, app) = app();
        let (_, open) = send(&app, "POST", "/api/statuses", Some(json!({"label": "Open"}))).await;
        let key = open["key"].as_str().unwrap().to_string();

        let (status, ticket) =
            send(&app, "POST", "/api/tickets", Some(ticket_body(json!(key), Value::Null))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ticket["status"], json!(key));

        let (status, removed) = send(&app, "DELETE", &format!("/api/statuses/{key}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["label"], "Open");

        let (_, ticket) = send(&app, "GET", "/api/tickets/1", None).await;
        assert_eq!(ticket["status"], Value::Null);
        let (_, statuses) = send(&app, "GET", "/api/statuses", None).await;
        assert_eq!(statuses, json!([]));
    }

    #[tokio::test]
    async fn category_rename_cascades_to_tickets() {
        let (_, app) = app();
        let (_, bug) = send(&app, "POST", "/api/categories", Some(json!({"label": "Bug"}))).await;
        let key = bug["key"].as_str().unwrap().to_string();
        send(&app, "POST", "/api/tickets", Some(ticket_body(Value::Null, json!(key)))).await;

        let (status, renamed) = send(
            &app,
            "PUT",
            &format!("/api/categories/{key}"),
            Some(json!({"key": "defect", "label": "Defect"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed, json!({"key": "defect", "label": "Defect"}));

        let (_, ticket) = send(&app, "GET", "/api/tickets/1", None).await;
        assert_eq!(ticket["category"], "defect");

        let (status, _) = send(&app, "GET", &format!("/api/categories/{key}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn comments_are_added_and_deleted() {
        let (_, app) = app();
        send(&app, "POST", "/api/tickets", Some(ticket_body(Value::Null, Value::Null))).await;

        let (status, comment) = send(
            &app,
            "POST",
            "/api/tickets/1/comments",
            Some(json!({"author": "bob", "content": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = comment["id"].as_str().unwrap().to_string();

        let (_, ticket) = send(&app, "GET", "/api/tickets/1", None).await;
        assert_eq!(ticket["comments"][0]["author"], "bob");

        let uri = format!("/api/tickets/1/comments/{id}");
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_flush_is_service_unavailable() {
        let (backend, app) = app();
        send(&app, "GET", "/api/tickets", None).await;
        backend.set_fail_writes(true);

        let (status, body) =
            send(&app, "POST", "/api/tickets", Some(ticket_body(Value::Null, Value::Null))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("storage unavailable"));

        backend.set_fail_writes(false);
        let (_, listed) = send(&app, "GET", "/api/tickets", None).await;
        assert_eq!(listed, json!([]));
    }
}
