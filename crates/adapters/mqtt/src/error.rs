//! MQTT adapter error types.

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected a request, e.g. because the event
    /// loop has shut down.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}
