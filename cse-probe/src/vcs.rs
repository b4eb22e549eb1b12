//! vCenter Server session probe.
//!
//! Opens a session through the vSphere Automation API
//! (`POST /rest/com/vmware/cis/session`) and deletes it again.

use std::time::Duration;

use async_trait::async_trait;
use cse_core::VcsConfig;
use serde::Deserialize;

use crate::http::{build_client, end_session, https_base, send_session_request};
use crate::{Probe, ProbeError, ProbeTarget};

const SESSION_PATH: &str = "/rest/com/vmware/cis/session";
const SESSION_HEADER: &str = "vmware-api-session-id";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    value: String,
}

/// Opens a vCenter Server session.
#[derive(Debug, Clone)]
pub struct VcsProbe {
    target: ProbeTarget,
    base_url: String,
    username: String,
    password: String,
    verify_tls: bool,
    timeout: Duration,
}

impl VcsProbe {
    /// Probe for the configured vCenter endpoint over HTTPS.
    #[must_use]
    pub fn new(config: &VcsConfig, timeout: Duration) -> Self {
        Self::with_base_url(config, https_base(config.endpoint()), timeout)
    }

    /// Probe against an explicit base URL, e.g. a local test server.
    #[must_use]
    pub fn with_base_url(config: &VcsConfig, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: ProbeTarget::Vcs {
                host: config.host.clone(),
                port: config.port,
                username: config.username.clone(),
            },
            base_url: base_url.into(),
            username: config.username.clone(),
            password: config.password.clone(),
            verify_tls: config.verify,
            timeout,
        }
    }
}

#[async_trait]
impl Probe for VcsProbe {
    fn target(&self) -> &ProbeTarget {
        &self.target
    }

    fn insecure(&self) -> bool {
        !self.verify_tls
    }

    async fn probe(&self) -> Result<(), ProbeError> {
        let client = build_client(self.verify_tls, self.timeout)?;
        let url = format!("{}{SESSION_PATH}", self.base_url);
        let login = client.post(&url).basic_auth(&self.username, Some(&self.password));

        let response = send_session_request(login, false).await?;
        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Connect(format!("invalid session response: {e}")))?;

        tracing::info!(host = %self.target.host(), user = %self.username, "vCenter session opened");

        end_session(client.delete(&url).header(SESSION_HEADER, session.value), "vcs").await;
        Ok(())
    }
}
