use async_trait::async_trait;
use std::time::Duration;

use crate::{
    config::WebhookConfig,
    error::{AppError, Result},
    integrations::{HousingEvent, Integration},
};

/// Posts every housing event as JSON to a configured URL.
pub struct WebhookIntegration {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookIntegration {
    pub fn new(config: Option<WebhookConfig>) -> Option<Self> {
        let config = config.filter(|cfg| cfg.enabled && !cfg.url.trim().is_empty())?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Some(Self { config, client })
    }
}

#[async_trait]
impl Integration for WebhookIntegration {
    fn name(&self) -> &str {
        "Webhook"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn health_check(&self) -> Result<()> {
        reqwest::Url::parse(&self.config.url)
            .map(|_| ())
            .map_err(|e| AppError::Integration(format!("Invalid webhook url: {}", e)))
    }

    async fn handle_event(&self, event: &HousingEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.config.url)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::Integration(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Integration(format!(
                "Webhook responded with {}",
                response.status()
            )));
        }

        Ok(())
    }
}
