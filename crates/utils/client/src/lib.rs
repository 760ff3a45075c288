//! A thin client for the chaingate gateway.

use serde_json::Value;

/// A gateway client.
#[derive(Debug, Clone)]
pub struct Client {
    /// The gateway address.
    pub gateway: String,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            gateway: Self::DEFAULT_GATEWAY.into(),
        }
    }
}

impl Client {
    /// The default gateway address.
    pub const DEFAULT_GATEWAY: &str = "127.0.0.1:37280";

    /// Creates a client with a localhost gateway.
    pub fn local() -> Self {
        Self::default()
    }

    /// Creates a client with the provided gateway address.
    pub fn with_gateway<G: AsRef<str>>(mut self, gateway: G) -> Self {
        self.gateway = gateway.as_ref().into();
        self
    }

    /// Computes the proxy URI for the provided endpoint path.
    pub fn uri<E: AsRef<str>>(&self, endpoint: E) -> String {
        format!(
            "http://{}/api/secureproxy?e={}",
            self.gateway,
            endpoint.as_ref()
        )
    }

    /// Checks gateway liveness, without resolver or upstream contact.
    pub async fn ping(&self) -> anyhow::Result<bool> {
        let uri = self.uri("ping_proxy");

        let body = reqwest::Client::new().get(uri).send().await?.text().await?;

        Ok(body == "pong")
    }

    /// Relays a GET request for the endpoint path through the gateway.
    pub async fn get<E: AsRef<str>>(&self, endpoint: E) -> anyhow::Result<reqwest::Response> {
        Ok(reqwest::Client::new().get(self.uri(endpoint)).send().await?)
    }

    /// Relays a JSON POST for the endpoint path through the gateway.
    pub async fn post_json<E: AsRef<str>>(
        &self,
        endpoint: E,
        body: &Value,
    ) -> anyhow::Result<reqwest::Response> {
        Ok(reqwest::Client::new()
            .post(self.uri(endpoint))
            .json(body)
            .send()
            .await?)
    }
}
