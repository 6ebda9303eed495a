//! Daemon - the main gateway service
//!
//! Wires the catalog, the external collaborators, and the HTTP API into a
//! running process.

use std::sync::Arc;

use secrecy::SecretString;

use crate::api::{self, ApiState, ModelInfo};
use crate::assistant::Assistant;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::llm::OpenAiChat;
use crate::session::SessionStore;
use crate::voice::SpeechToText;
use crate::Result;

/// The gateway daemon
pub struct Daemon {
    router: axum::Router,
    port: u16,
}

impl Daemon {
    /// Build the daemon from configuration
    ///
    /// Loading the catalog and constructing collaborators happens here, so
    /// a bad menu document fails at startup rather than on the first turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or a configured
    /// collaborator cannot be constructed.
    pub fn new(config: &Config, port: u16) -> Result<Self> {
        let catalog = Arc::new(match &config.menu_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::embedded()?,
        });

        let assistant = match &config.api_keys.openai {
            Some(key) => {
                let chat = OpenAiChat::new(
                    SecretString::from(key.clone()),
                    &config.llm,
                    config.request_timeout,
                )?;
                Some(Arc::new(Assistant::new(
                    Arc::clone(&catalog),
                    Arc::new(chat),
                    config.request_timeout,
                )))
            }
            None => {
                tracing::warn!("no OPENAI_API_KEY set, conversational turns disabled");
                None
            }
        };

        let stt = if config.voice.enabled {
            SpeechToText::from_config(&config.voice, &config.api_keys, config.request_timeout)?
                .map(Arc::new)
        } else {
            None
        };

        let model_info = assistant.as_ref().map(|_| ModelInfo {
            model_id: config.llm.model.clone(),
            provider: "openai".to_string(),
        });

        let state = Arc::new(ApiState {
            catalog,
            assistant,
            stt,
            sessions: SessionStore::new(),
            model_info,
            default_language: config.language.clone(),
        });

        let router = api::build_router(state, config.static_dir.as_deref());

        Ok(Self { router, port })
    }

    /// Run until interrupted
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.port)).await?;
        tracing::info!(port = self.port, "carte gateway listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("carte gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
