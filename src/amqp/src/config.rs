/// Identifies one broker endpoint.
///
/// Connections are cached per config, so the whole struct is the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub vhost: String,
    pub username: String,
    pub password: String,
}

impl BrokerConfig {
    /// Renders the endpoint as an AMQP URI.
    ///
    /// An empty `vhost` selects the broker's default virtual host.
    pub fn amqp_uri(&self) -> String {
        let mut uri = format!(
            "amqp://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        );
        if !self.vhost.is_empty() {
            uri.push('/');
            uri.push_str(&self.vhost);
        }
        uri
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5672,
            vhost: String::new(),
            username: "guest".into(),
            password: "guest".into(),
        }
    }
}
