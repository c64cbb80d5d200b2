//! MQTT consumer configuration.

use serde::Deserialize;

use driphub_domain::event::Topic;

/// Configuration for the MQTT event consumer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Topics to subscribe to. Defaults to every platform event topic.
    pub topics: Vec<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "driphub".to_string(),
            keep_alive_secs: 30,
            topics: Topic::ALL.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.broker_host, "localhost");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.client_id, "driphub");
        assert_eq!(config.keep_alive_secs, 30);
        assert_eq!(
            config.topics,
            vec!["user.events", "order.events", "product.events", "cart.events"]
        );
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            broker_host = "mqtt.example.com"
            broker_port = 8883
            client_id = "driphub-staging"
            keep_alive_secs = 60
            topics = ["cart.events"]
        "#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.broker_host, "mqtt.example.com");
        assert_eq!(config.broker_port, 8883);
        assert_eq!(config.client_id, "driphub-staging");
        assert_eq!(config.keep_alive_secs, 60);
        assert_eq!(config.topics, vec!["cart.events"]);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = r#"broker_host = "192.168.1.100""#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.broker_host, "192.168.1.100");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.client_id, "driphub");
        assert_eq!(config.topics.len(), 4);
    }
}
