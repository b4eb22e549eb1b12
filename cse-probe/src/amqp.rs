//! AMQP broker probe.

use async_trait::async_trait;
use cse_core::{AmqpConfig, AMQP_VHOST};
use lapin::uri::{AMQPAuthority, AMQPUri, AMQPUserInfo};
use lapin::{Connection, ConnectionProperties};

use crate::{Probe, ProbeError, ProbeTarget};

/// Reply code sent when the probe closes its connection.
const REPLY_SUCCESS: u16 = 200;

/// Build the broker URI for a config section (vhost `/`).
#[must_use]
pub fn amqp_uri(config: &AmqpConfig) -> AMQPUri {
    AMQPUri {
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.user.clone(),
                password: config.password.clone(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost: AMQP_VHOST.to_owned(),
        ..AMQPUri::default()
    }
}

/// Open a connection to the broker described by `config`.
///
/// # Errors
/// Returns [`ProbeError::Connect`] if the broker cannot be reached or refuses
/// the credentials.
pub async fn connect(config: &AmqpConfig) -> Result<Connection, ProbeError> {
    tracing::debug!(endpoint = %config.endpoint(), "connecting to AMQP broker");
    Connection::connect_uri(amqp_uri(config), ConnectionProperties::default())
        .await
        .map_err(|e| ProbeError::Connect(e.to_string()))
}

/// Checks that the broker accepts a connection.
#[derive(Debug, Clone)]
pub struct AmqpProbe {
    target: ProbeTarget,
    config: AmqpConfig,
}

impl AmqpProbe {
    #[must_use]
    pub fn new(config: &AmqpConfig) -> Self {
        Self {
            target: ProbeTarget::Amqp { host: config.host.clone(), port: config.port },
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Probe for AmqpProbe {
    fn target(&self) -> &ProbeTarget {
        &self.target
    }

    async fn probe(&self) -> Result<(), ProbeError> {
        let connection = connect(&self.config).await?;
        let open = connection.status().connected();

        // Close regardless of the status we just read.
        if let Err(e) = connection.close(REPLY_SUCCESS, "probe complete").await {
            tracing::debug!(error = %e, "closing AMQP probe connection");
        }

        if open {
            Ok(())
        } else {
            Err(ProbeError::NotOpen)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: u16) -> AmqpConfig {
        match cse_core::Config::from_yaml_str(&format!(
            "amqp: {{host: 127.0.0.1, port: {port}, user: guest, password: 'p@ss/word'}}
vcd: {{host: h, port: 443, username: u, password: p, api_version: '6.0', verify: true}}
vcs: {{host: h, port: 443, username: u, password: p}}"
        )) {
            Ok(c) => c.amqp,
            Err(e) => panic!("test config: {e}"),
        }
    }

    #[test]
    fn uri_uses_root_vhost_and_credentials() {
        let uri = amqp_uri(&config(5672));
        assert_eq!(uri.vhost, "/");
        assert_eq!(uri.authority.host, "127.0.0.1");
        assert_eq!(uri.authority.port, 5672);
        assert_eq!(uri.authority.userinfo.username, "guest");
        assert_eq!(uri.authority.userinfo.password, "p@ss/word");
    }

    #[test]
    fn probe_target_mirrors_config() {
        let probe = AmqpProbe::new(&config(5673));
        assert_eq!(
            probe.target(),
            &ProbeTarget::Amqp { host: "127.0.0.1".to_owned(), port: 5673 }
        );
        assert!(!probe.insecure());
    }

    #[tokio::test]
    async fn probe_against_closed_port_fails_with_connect() {
        // Bind then drop a listener to get a port nothing listens on.
        let port = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(l) => match l.local_addr() {
                Ok(addr) => addr.port(),
                Err(e) => panic!("local_addr: {e}"),
            },
            Err(e) => panic!("bind: {e}"),
        };
        let probe = AmqpProbe::new(&config(port));
        let result = probe.probe().await;
        assert!(
            matches!(result, Err(ProbeError::Connect(_))),
            "closed port must fail with Connect, got {result:?}"
        );
    }
}
