//! Blocking `Transport` backed by a `ureq` agent.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFailure};

/// Executes requests with a shared `ureq::Agent`.
///
/// The agent is configured with a global per-request timeout and with
/// status-code-as-error disabled, so 4xx/5xx responses come back as data and
/// `ApiClient` decides what they mean.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let url = request.url.as_str();
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), &request.headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), &request.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), &request.headers).send_empty(),
        };

        let mut response = result.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportFailure::NoResponse(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}

/// Split ureq failures into "never dispatched" and "no response".
fn classify(err: ureq::Error) -> TransportFailure {
    match err {
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportFailure::Setup(err.to_string()),
        other => TransportFailure::NoResponse(other.to_string()),
    }
}
