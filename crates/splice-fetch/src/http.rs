//! HTTP fetcher backed by reqwest
//!
//! Each request runs on its own task and races a cancellation token.
//! Genuine HTTP redirects are followed by the client before the
//! completion is produced.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::FetchError;
use crate::fetcher::{
    Completion, FetchRequest, FetchResponse, Fetcher, Method, RequestHandle, RequestId,
};
use crate::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ReqwestFetcher {
    client: reqwest::Client,
    base_url: Url,
    completions: mpsc::UnboundedSender<Completion>,
    runtime: Handle,
}

impl ReqwestFetcher {
    /// Must be called from within a tokio runtime.
    pub fn new(base_url: Url, completions: mpsc::UnboundedSender<Completion>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Self::with_client(client, base_url, completions)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: Url,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| FetchError::NoRuntime)?;

        Ok(Self {
            client,
            base_url,
            completions,
            runtime,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Fetcher for ReqwestFetcher {
    fn send(&self, id: RequestId, request: FetchRequest) -> Box<dyn RequestHandle> {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let client = self.client.clone();
        let completions = self.completions.clone();
        let target = self.base_url.join(&request.url);

        tracing::debug!(
            request_id = %id,
            method = request.method.as_str(),
            url = %request.url,
            "Sending fragment request"
        );

        self.runtime.spawn(async move {
            let outcome = match target {
                Ok(target) => {
                    tokio::select! {
                        biased;
                        _ = cancelled.cancelled() => Err(FetchError::Aborted),
                        result = execute(&client, target, request) => result,
                    }
                }
                Err(e) => Err(FetchError::InvalidUrl(e.to_string())),
            };

            if completions.send(Completion { id, outcome }).is_err() {
                tracing::debug!(request_id = %id, "Completion receiver dropped");
            }
        });

        Box::new(TokenHandle { token })
    }
}

struct TokenHandle {
    token: CancellationToken,
}

impl RequestHandle for TokenHandle {
    fn abort(&mut self) {
        self.token.cancel();
    }
}

async fn execute(
    client: &reqwest::Client,
    target: Url,
    request: FetchRequest,
) -> Result<FetchResponse> {
    let method = match request.method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
    };

    let mut builder = client.request(method, target);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        Ok(FetchResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
