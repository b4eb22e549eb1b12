//! vCloud Director system-administrator login probe.
//!
//! Logs in through the vCloud API (`POST /api/sessions`) as
//! `<username>@System`, then logs out again.

use std::time::Duration;

use async_trait::async_trait;
use cse_core::VcdConfig;

use crate::http::{build_client, end_session, https_base, send_session_request};
use crate::{Probe, ProbeError, ProbeTarget};

/// Organisation every system administrator belongs to.
const SYSTEM_ORG: &str = "System";

/// Response header carrying the session token.
const AUTH_HEADER: &str = "x-vcloud-authorization";

/// Logs into vCloud Director as system administrator.
#[derive(Debug, Clone)]
pub struct VcdProbe {
    target: ProbeTarget,
    base_url: String,
    username: String,
    password: String,
    api_version: String,
    verify_tls: bool,
    log_traffic: bool,
    timeout: Duration,
}

impl VcdProbe {
    /// Probe for the configured vCD endpoint over HTTPS.
    #[must_use]
    pub fn new(config: &VcdConfig, timeout: Duration) -> Self {
        Self::with_base_url(config, https_base(config.endpoint()), timeout)
    }

    /// Probe against an explicit base URL, e.g. a local test server.
    #[must_use]
    pub fn with_base_url(config: &VcdConfig, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: ProbeTarget::Vcd {
                host: config.host.clone(),
                port: config.port,
                username: config.username.clone(),
            },
            base_url: base_url.into(),
            username: config.username.clone(),
            password: config.password.clone(),
            api_version: config.api_version.clone(),
            verify_tls: config.verify,
            log_traffic: config.log,
            timeout,
        }
    }

    fn accept_header(&self) -> String {
        format!("application/*+xml;version={}", self.api_version)
    }
}

#[async_trait]
impl Probe for VcdProbe {
    fn target(&self) -> &ProbeTarget {
        &self.target
    }

    fn insecure(&self) -> bool {
        !self.verify_tls
    }

    async fn probe(&self) -> Result<(), ProbeError> {
        let client = build_client(self.verify_tls, self.timeout)?;
        let login = client
            .post(format!("{}/api/sessions", self.base_url))
            .basic_auth(format!("{}@{SYSTEM_ORG}", self.username), Some(&self.password))
            .header(reqwest::header::ACCEPT, self.accept_header());

        let response = send_session_request(login, self.log_traffic).await?;
        tracing::info!(host = %self.target.host(), "logged into vCloud Director");

        if let Some(token) = response.headers().get(AUTH_HEADER).cloned() {
            let logout = client
                .delete(format!("{}/api/session", self.base_url))
                .header(AUTH_HEADER, token)
                .header(reqwest::header::ACCEPT, self.accept_header());
            end_session(logout, "vcd").await;
        }
        Ok(())
    }
}
