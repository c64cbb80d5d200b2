//! The consumer loop bridging the broker to the event ingestor.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use driphub_app::event_ingestor::EventIngestor;
use driphub_app::ports::{ActionStore, AutomationRepository, EnginePublisher};
use driphub_domain::error::DripHubError;

use crate::config::MqttConfig;
use crate::error::MqttError;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Consumes platform events from the MQTT broker.
///
/// Each publish is handed to the ingestor as-is; interpreting the
/// payload, including dropping malformed messages, happens there.
pub struct EventConsumer<R, S, P> {
    client: AsyncClient,
    event_loop: EventLoop,
    topics: Vec<String>,
    ingestor: Arc<EventIngestor<R, S, P>>,
}

impl<R, S, P> EventConsumer<R, S, P>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    /// Create a consumer from config. No network activity happens until
    /// [`EventConsumer::start`] runs the event loop.
    #[must_use]
    pub fn new(config: &MqttConfig, ingestor: Arc<EventIngestor<R, S, P>>) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));

        let (client, event_loop) = AsyncClient::new(options, 64);
        Self {
            client,
            event_loop,
            topics: config.topics.clone(),
            ingestor,
        }
    }

    /// Run the consumer as a background task until `shutdown` flips or
    /// its sender is dropped, then disconnect from the broker.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self {
            client,
            mut event_loop,
            topics,
            ingestor,
        } = self;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("disconnecting from mqtt broker");
                    if let Err(err) = client.disconnect().await {
                        tracing::warn!(error = %err, "mqtt disconnect failed");
                    }
                    return;
                }
                event = event_loop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::info!("connected to mqtt broker");
                        // Sessions are not resumed, so every new
                        // connection subscribes again.
                        if let Err(err) = subscribe(&client, &topics).await {
                            tracing::warn!(error = %err, "mqtt subscribe failed");
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let result = ingestor
                            .handle_message(&publish.topic, &publish.payload)
                            .await;
                        // Malformed messages are already logged and
                        // published by the ingestor.
                        if let Err(err) = result {
                            if !matches!(err, DripHubError::MalformedEvent(_)) {
                                tracing::error!(
                                    error = %err,
                                    topic = %publish.topic,
                                    "event evaluation failed"
                                );
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "mqtt connection error, retrying");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                },
            }
        }
    }
}

async fn subscribe(client: &AsyncClient, topics: &[String]) -> Result<(), MqttError> {
    for topic in topics {
        client
            .subscribe(topic.clone(), QoS::AtLeastOnce)
            .await
            .map_err(MqttError::Client)?;
        tracing::debug!(topic, "subscribed");
    }
    Ok(())
}
