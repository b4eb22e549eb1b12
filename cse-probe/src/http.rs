//! Shared HTTPS plumbing for the vCloud Director and vCenter probes.
//!
//! Each probe builds its own client so that disabling certificate
//! verification for one endpoint never affects another.

use std::time::Duration;

use cse_core::Endpoint;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::ProbeError;

/// Build a client for one probe.
///
/// # Errors
/// Returns [`ProbeError::Client`] if the TLS backend cannot be initialised.
pub(crate) fn build_client(verify_tls: bool, timeout: Duration) -> Result<Client, ProbeError> {
    Client::builder()
        .danger_accept_invalid_certs(!verify_tls)
        .timeout(timeout)
        .build()
        .map_err(|e| ProbeError::Client(e.to_string()))
}

/// Base URL for an HTTPS endpoint.
pub(crate) fn https_base(endpoint: Endpoint<'_>) -> String {
    format!("https://{endpoint}")
}

/// Longest body excerpt kept in [`ProbeError::UnexpectedStatus`].
const BODY_EXCERPT_CHARS: usize = 120;

/// Headers whose values are session credentials.
const SECRET_HEADERS: [&str; 5] = [
    "authorization",
    "x-vcloud-authorization",
    "x-vmware-vcloud-access-token",
    "vmware-api-session-id",
    "set-cookie",
];

/// Header name/value pairs safe to log.
pub(crate) fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if SECRET_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_owned()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_owned(), shown)
        })
        .collect()
}

/// First non-blank line of `body`, truncated.
pub(crate) fn body_excerpt(body: &str) -> String {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
    let mut excerpt: String = line.chars().take(BODY_EXCERPT_CHARS).collect();
    if line.chars().count() > BODY_EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

/// Send a session request and require a success status.
///
/// The full body of a rejected response is logged; the error only carries
/// a one-line excerpt.
///
/// # Errors
/// Returns [`ProbeError::Connect`] on transport errors,
/// [`ProbeError::AuthRejected`] on 401/403 and
/// [`ProbeError::UnexpectedStatus`] on any other non-success status.
pub(crate) async fn send_session_request(
    request: RequestBuilder,
    log_traffic: bool,
) -> Result<Response, ProbeError> {
    let response = request.send().await.map_err(|e| ProbeError::Connect(e.to_string()))?;

    let status = response.status();
    if log_traffic {
        tracing::debug!(
            url = %response.url(),
            status = status.as_u16(),
            headers = ?redacted_headers(response.headers()),
            "session response"
        );
    }

    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProbeError::AuthRejected { status: status.as_u16() });
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(url = %url, status = status.as_u16(), body = %body, "session request rejected");
    Err(ProbeError::UnexpectedStatus { status: status.as_u16(), body: body_excerpt(&body) })
}

/// Release a session; failures are logged and ignored.
pub(crate) async fn end_session(request: RequestBuilder, what: &str) {
    match request.send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::debug!(session = what, "session released");
        }
        Ok(resp) => {
            tracing::debug!(session = what, status = resp.status().as_u16(), "logout rejected");
        }
        Err(e) => tracing::debug!(session = what, error = %e, "logout failed"),
    }
}
