//! The `cse run` broker service.
//!
//! Opens one AMQP connection, declares the configured exchange and a queue
//! bound with the routing key, then starts `service.listeners` consumer
//! tasks on their own channels. Each listener logs and acknowledges the
//! requests it receives. The service stops on shutdown or as soon as any
//! listener stops, and reports that listener's error.

use std::future::Future;

use chrono::{DateTime, Utc};
use cse_core::{AmqpConfig, Config};
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicQosOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ExchangeKind};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::error::CliError;

/// Reply code sent when the service closes its connection.
const REPLY_SUCCESS: u16 = 200;

/// Unacknowledged deliveries each listener may hold.
const PREFETCH: u16 = 1;

/// Identity of one running listener.
#[derive(Debug, Clone)]
pub struct ListenerEntry {
    /// Consumer tag registered with the broker.
    pub consumer_tag: String,
    pub started_at: DateTime<Utc>,
}

impl ListenerEntry {
    /// A fresh listener identity with a unique consumer tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            consumer_tag: format!("{}-{}", cse_core::version::PRODUCT, Uuid::new_v4()),
            started_at: Utc::now(),
        }
    }
}

impl Default for ListenerEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// What a listener task yields when it ends: its consumer tag and outcome.
pub type ListenerExit = (String, Result<(), CliError>);

/// Declare the exchange and the request queue, and bind them.
async fn declare_topology(channel: &Channel, amqp: &AmqpConfig) -> Result<(), CliError> {
    channel
        .exchange_declare(
            &amqp.exchange,
            ExchangeKind::Direct,
            ExchangeDeclareOptions { durable: true, ..ExchangeDeclareOptions::default() },
            FieldTable::default(),
        )
        .await?;
    channel
        .queue_declare(
            &amqp.routing_key,
            QueueDeclareOptions { durable: true, ..QueueDeclareOptions::default() },
            FieldTable::default(),
        )
        .await?;
    channel
        .queue_bind(
            &amqp.routing_key,
            &amqp.exchange,
            &amqp.routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;
    tracing::info!(
        exchange = %amqp.exchange,
        queue = %amqp.routing_key,
        "declared request queue"
    );
    Ok(())
}

/// Consume from `queue` until the consumer stream ends.
async fn listen(channel: Channel, queue: String, entry: ListenerEntry) -> Result<(), CliError> {
    channel.basic_qos(PREFETCH, BasicQosOptions::default()).await?;
    let mut consumer = channel
        .basic_consume(
            &queue,
            &entry.consumer_tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;
    tracing::info!(
        consumer_tag = %entry.consumer_tag,
        started_at = %entry.started_at.to_rfc3339(),
        "listener started"
    );

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;
        tracing::info!(
            consumer_tag = %entry.consumer_tag,
            delivery_tag = delivery.delivery_tag,
            routing_key = delivery.routing_key.as_str(),
            bytes = delivery.data.len(),
            "received request"
        );
        delivery.ack(BasicAckOptions::default()).await?;
    }
    tracing::info!(consumer_tag = %entry.consumer_tag, "listener stopped");
    Ok(())
}

/// Run the broker service until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the broker cannot be reached or the exchange, queue
/// or consumers cannot be set up.
pub async fn run<F>(config: &Config, shutdown: F) -> Result<(), CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let connection = cse_probe::amqp::connect(&config.amqp).await?;
    let result = serve(&connection, config, shutdown).await;

    if let Err(e) = connection.close(REPLY_SUCCESS, "service stopped").await {
        tracing::warn!(error = %e, "closing AMQP connection");
    }
    result
}

async fn serve<F>(connection: &Connection, config: &Config, shutdown: F) -> Result<(), CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let control = connection.create_channel().await?;
    declare_topology(&control, &config.amqp).await?;

    // Dropping the set on an early return aborts every listener in it.
    let mut listeners = JoinSet::new();
    for _ in 0..config.service.listeners {
        let channel = connection.create_channel().await?;
        let entry = ListenerEntry::new();
        let queue = config.amqp.routing_key.clone();
        listeners.spawn(async move {
            let consumer_tag = entry.consumer_tag.clone();
            (consumer_tag, listen(channel, queue, entry).await)
        });
    }
    tracing::info!(listeners = listeners.len(), "service running, waiting for requests");

    supervise(&mut listeners, shutdown).await
}

/// Wait for `shutdown` or the first listener to end, then stop the rest.
///
/// A listener ending for any reason stops the service: its error is
/// returned, and a listener whose consumer closed cleanly is reported as
/// [`CliError::ListenerStopped`].
///
/// # Errors
/// Returns the first listener failure, or the error `shutdown` resolved
/// with.
pub async fn supervise<F>(listeners: &mut JoinSet<ListenerExit>, shutdown: F) -> Result<(), CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let outcome = tokio::select! {
        stopped = shutdown => {
            tracing::info!("shutdown requested, stopping listeners");
            stopped.map_err(CliError::from)
        }
        Some(joined) = listeners.join_next() => match joined {
            Ok((consumer_tag, Ok(()))) => {
                tracing::error!(consumer_tag = %consumer_tag, "listener stopped");
                Err(CliError::ListenerStopped { consumer_tag })
            }
            Ok((consumer_tag, Err(e))) => {
                tracing::error!(consumer_tag = %consumer_tag, error = %e, "listener failed");
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "listener task aborted");
                Err(CliError::Listener(e))
            }
        },
    };
    listeners.shutdown().await;
    outcome
}
