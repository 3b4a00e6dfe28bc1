//! Test server control endpoint
//!
//! The server that hosts the editor build accepts a few commands that
//! put it into known states between scenarios. Every command answers with
//! an empty JSON object on success.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};
use wedtest_common::ServerConfig;

use crate::error::{E2eError, E2eResult};

/// Client for the server's control endpoint
pub struct ControlClient {
    client: reqwest::Client,
    url: String,
}

impl ControlClient {
    pub fn new(config: &ServerConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            url: config.control_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Put the server back into its initial state
    pub async fn reset(&self) -> E2eResult<()> {
        self.send("reset", &[("command", "reset")]).await
    }

    /// Reset, then make every subsequent save fail
    pub async fn fail_on_save(&self) -> E2eResult<()> {
        self.reset().await?;
        self.send("fail_on_save", &[("command", "fail_on_save"), ("value", "1")])
            .await
    }

    async fn send(&self, command: &str, form: &[(&str, &str)]) -> E2eResult<()> {
        let response = self.client.post(&self.url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let accepted = status.is_success()
            && serde_json::from_str::<Value>(&body)
                .map(|reply| reply == Value::Object(Default::default()))
                .unwrap_or(false);

        if !accepted {
            warn!(command, %status, "Control command rejected");
            return Err(E2eError::ControlRejected {
                command: command.to_string(),
                reply: format!("{} {}", status, body.trim()),
            });
        }

        info!(command, "Control command accepted");
        Ok(())
    }
}
