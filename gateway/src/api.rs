use axum::{extract::State, response::Json, routing::get, Router};
use common::status::StatusSnapshot;
use poller::StatusHandle;
use serde::Serialize;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub status: StatusHandle,
    pub server_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub server_id: String,
    pub server_name: String,
    #[serde(flatten)]
    pub status: StatusSnapshot,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        server_id: state.status.server_id().to_string(),
        server_name: state.server_name.clone(),
        status: state.status.snapshot().await,
    })
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use poller::{PollerError, PollerSettings, ServerData, StatusPoller, StatusSource};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedSource(Option<ServerData>);

    #[async_trait]
    impl StatusSource for FixedSource {
        async fn fetch(&self, _server_id: &str) -> Result<ServerData, PollerError> {
            self.0.clone().ok_or(PollerError::Status(503))
        }
    }

    fn poller(data: Option<ServerData>) -> StatusPoller {
        StatusPoller::new(
            PollerSettings::new("abc123", Duration::from_secs(60)),
            Arc::new(FixedSource(data)),
        )
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_reports_online_server() {
        let poller = poller(Some(ServerData {
            hostname: Some("srv".into()),
            clients: Some(5),
            sv_maxclients: Some(32),
            ..Default::default()
        }));
        poller.refresh().await;

        let app = router(AppState { status: poller.handle(), server_name: "Downtown".into() });
        let body = get_json(app, "/status").await;

        assert_eq!(body["serverId"], "abc123");
        assert_eq!(body["serverName"], "Downtown");
        assert_eq!(body["online"], true);
        assert_eq!(body["currentCount"], 5);
        assert_eq!(body["maxPlayers"], 32);
        assert_eq!(body["hostname"], "srv");
    }

    #[tokio::test]
    async fn test_status_reports_offline_server() {
        let poller = poller(None);
        poller.refresh().await;

        let app = router(AppState { status: poller.handle(), server_name: "Downtown".into() });
        let body = get_json(app, "/status").await;

        assert_eq!(body["online"], false);
        assert_eq!(body["currentCount"], 0);
        assert_eq!(body["maxPlayers"], 0);
        assert!(body.get("hostname").is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState { status: poller(None).handle(), server_name: String::new() });
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
