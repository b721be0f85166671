use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::backend_model::{
    ActionAck, DiscardReceipt, ErrorBody, HistoryPage, InputRequest, SaveReceipt, SessionInfo,
    SnapshotPayload, SwipeRequest, TapRequest,
};
use crate::backend::traits::{ActionExecutor, HistoryProvider, SessionLifecycle, SnapshotProvider};
use crate::console::error::ConsoleError;
use crate::gesture::gesture_model::SwipeDirection;

/// Collection server reached over HTTP/JSON.
///
/// Every endpoint is request/acknowledge: one JSON body out, one JSON body
/// back. Non-2xx replies carry `{"detail": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::fetch(base_url, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, endpoint))
    }

    /// Send a request and decode a successful JSON reply.
    async fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> Result<T, ConsoleError> {
        debug!(endpoint, "backend request");

        let response = request.send().await.map_err(|e| ConsoleError::fetch(endpoint, e))?;
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| status.to_string());
            return Err(ConsoleError::fetch(endpoint, detail));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ConsoleError::fetch(endpoint, format!("invalid response body: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ConsoleError> {
        self.send(endpoint, self.request(Method::GET, endpoint)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ConsoleError> {
        let mut request = self.request(Method::POST, endpoint);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(endpoint, request).await
    }
}

#[async_trait]
impl SnapshotProvider for HttpBackend {
    async fn fetch_snapshot(&self) -> Result<SnapshotPayload, ConsoleError> {
        self.get("/screenshot").await
    }
}

#[async_trait]
impl ActionExecutor for HttpBackend {
    async fn tap(&self, x: i32, y: i32) -> Result<ActionAck, ConsoleError> {
        self.post("/click", Some(&TapRequest { x, y })).await
    }

    async fn swipe(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        direction: SwipeDirection,
    ) -> Result<ActionAck, ConsoleError> {
        let body = SwipeRequest {
            start_x,
            start_y,
            end_x,
            end_y,
            direction,
        };
        self.post("/swipe", Some(&body)).await
    }

    async fn input_text(&self, text: &str) -> Result<ActionAck, ConsoleError> {
        let body = InputRequest { text: text.to_string() };
        self.post("/input", Some(&body)).await
    }
}

#[async_trait]
impl HistoryProvider for HttpBackend {
    async fn list_actions(&self) -> Result<HistoryPage, ConsoleError> {
        self.get("/action_history").await
    }
}

#[async_trait]
impl SessionLifecycle for HttpBackend {
    async fn begin_session(&self, info: &SessionInfo) -> Result<(), ConsoleError> {
        let _: serde_json::Value = self.post("/set_task_description", Some(info)).await?;
        Ok(())
    }

    async fn end_session(&self) -> Result<SaveReceipt, ConsoleError> {
        self.post::<(), _>("/save_data", None).await
    }

    async fn discard_session(&self) -> Result<DiscardReceipt, ConsoleError> {
        self.post::<(), _>("/delete_data", None).await
    }
}
