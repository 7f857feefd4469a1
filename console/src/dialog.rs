//! The debug/preview dialog for one prompt text.
//!
//! Opening the dialog loads the scene registry through its own
//! `RegistryCache`, resolves the text's placeholders and builds the params
//! panel. Editing the text re-syncs the panel; values already entered for
//! placeholders that are still present survive. Sending flattens the panel
//! into `additional_params`. Closing the dialog clears the cache and cancels
//! any in-flight stream or poll.

use std::sync::Arc;
use std::time::Duration;

use common::model::place_holder::{PlaceholderRegistry, PlaceholderToken};
use common::requests::{DebugRequest, ValidationOutcome};
use common::template::{resolve_tokens, validate_text, ParamsPanel};
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::Result;
use crate::polling::DEFAULT_POLL_INTERVAL;
use crate::registry::RegistryCache;
use crate::session::{run_api, run_chat, DebugMode, DebugSession};

pub struct DebugDialog {
    cache: RegistryCache,
    scene: String,
    text: String,
    registry: Arc<PlaceholderRegistry>,
    tokens: Vec<PlaceholderToken>,
    pub panel: ParamsPanel,
    pub mode: DebugMode,
    pub session: DebugSession,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl DebugDialog {
    pub async fn open(client: ApiClient, scene: &str, text: &str) -> Result<Self> {
        let cache = RegistryCache::new(client);
        let registry = cache.get(scene).await?;
        let mut dialog = Self {
            cache,
            scene: scene.to_string(),
            text: String::new(),
            registry,
            tokens: Vec::new(),
            panel: ParamsPanel::new(),
            mode: DebugMode::default(),
            session: DebugSession::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        };
        dialog.set_text(text);
        Ok(dialog)
    }

    pub fn with_mode(mut self, mode: DebugMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[PlaceholderToken] {
        &self.tokens
    }

    pub fn registry(&self) -> &PlaceholderRegistry {
        &self.registry
    }

    /// Replaces the text and rebuilds the panel for its placeholders.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.tokens = resolve_tokens(text, &self.registry);
        self.panel.sync(&self.tokens, &self.registry);
    }

    /// Checks the current text against the cached registry.
    pub fn validate(&self) -> ValidationOutcome {
        validate_text(&self.text, &self.registry)
    }

    /// Re-reads the scene registry, e.g. after definitions were edited.
    pub async fn reload_registry(&mut self) -> Result<()> {
        self.cache.clear();
        self.registry = self.cache.get(&self.scene).await?;
        let text = std::mem::take(&mut self.text);
        self.set_text(&text);
        Ok(())
    }

    /// The request the next send would POST.
    pub fn request(&self) -> DebugRequest {
        let notify_url = match &self.mode {
            DebugMode::Api { notify_url } => notify_url.clone(),
            DebugMode::Chat => None,
        };
        DebugRequest {
            scene: self.scene.clone(),
            content: Some(self.text.clone()),
            prompt_id: None,
            additional_params: self.panel.submission_values(),
            notify_url,
        }
    }

    /// A token that cancels in-flight work when the dialog closes.
    pub fn closer(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Sends the current text with the current params in the dialog's mode.
    pub async fn send(&mut self) {
        let req = self.request();
        let client = self.cache.client().clone();
        match self.mode {
            DebugMode::Chat => {
                run_chat(&mut self.session, &client, &self.text, &req, &self.cancel).await
            }
            DebugMode::Api { .. } => {
                run_api(
                    &mut self.session,
                    &client,
                    &self.text,
                    &req,
                    self.poll_interval,
                    &self.cancel,
                )
                .await
            }
        }
    }

    pub fn close(self) {
        log::debug!("closing debug dialog for scene {}", self.scene);
    }
}

impl Drop for DebugDialog {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.cache.clear();
    }
}
