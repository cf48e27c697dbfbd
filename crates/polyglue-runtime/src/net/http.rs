//! HTTP transport over reqwest

use polyglue_core::{GlueError, GlueResult};
use polyglue_transport::{HttpListener, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Runs each request as a task on a Tokio runtime
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    handle: Handle,
}

impl ReqwestHttpTransport {
    /// `timeout` bounds each request from connect to the end of the body
    pub fn new(handle: Handle, timeout: Duration) -> GlueResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("polyglue/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GlueError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, handle })
    }

    async fn execute(client: reqwest::Client, request: &HttpRequest) -> GlueResult<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| {
                GlueError::Transport(format!("{} {} failed: {}", request.method, request.url, e))
            })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| GlueError::Transport(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

impl HttpTransport for ReqwestHttpTransport {
    fn request(&self, request: HttpRequest, listener: Arc<dyn HttpListener>) {
        let client = self.client.clone();
        tracing::debug!(method = %request.method, url = %request.url, "sending HTTP request");

        self.handle.spawn(async move {
            let result = Self::execute(client, &request).await;
            match &result {
                Ok(response) => {
                    tracing::debug!(
                        url = %request.url,
                        status = response.status,
                        "HTTP response received"
                    )
                }
                Err(e) => tracing::warn!(url = %request.url, error = %e, "HTTP request failed"),
            }
            listener.on_http_response(&request, result);
        });
    }
}

#[cfg(test)]
#[path = "http/http_tests.rs"]
mod http_tests;
