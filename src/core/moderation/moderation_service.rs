// Moderation workflow - core business logic for kick/warn/ban/unban.
//
// One parameterized state machine:
//   config check -> validate player -> await confirmation -> dispatch -> report
//
// NO Discord dependencies here - rendering and reaction collection go through
// the `ModerationSurface` port.

use super::moderation_models::{
    AuditEntry, DeliveryPath, DispatchError, ModerationOutcome, ModerationRequest,
    ModerationView, ValidationFailure,
};
use crate::core::confirmation::{
    ConfirmationOutcome, ConfirmationRequest, Decision, Responder, SurfaceError,
    MODERATION_EMOJI,
};
use crate::core::roblox::{
    DatastoreEntry, DatastoreError, ModerationRecord, PlayerIdentifier, PlayerLookup,
    PublishError, RobloxApi, ShutdownSignal, UniverseId, MESSAGING_TOPIC,
};
use crate::core::settings::{
    Credentials, SettingKey, SettingsError, SettingsService, SettingsStore, UniverseDirectory,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Failures that abort a run. Everything else ends in a `ModerationOutcome`.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

// ============================================================================
// SURFACE TRAIT (PORT)
// ============================================================================

/// Where a moderation workflow shows itself. The Discord implementation
/// replies to the slash command, then edits that reply in place.
#[async_trait]
pub trait ModerationSurface: Send {
    async fn render(&mut self, view: ModerationView) -> Result<(), SurfaceError>;

    /// Attach the affordances to the rendered prompt and wait for one
    /// qualifying reaction.
    async fn await_confirmation(&mut self, request: &ConfirmationRequest) -> ConfirmationOutcome;

    async fn post_audit(&mut self, channel_id: u64, entry: &AuditEntry) -> Result<(), SurfaceError>;
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Make the one external call for an approved action.
pub async fn dispatch<R: RobloxApi + ?Sized>(
    roblox: &R,
    credentials: &Credentials,
    universe_id: UniverseId,
    delivery: DeliveryPath,
    record: &ModerationRecord,
) -> Result<(), DispatchError> {
    match delivery {
        DeliveryPath::Ephemeral => {
            let message = serde_json::to_string(record)
                .map_err(|e| PublishError::Encode(e.to_string()))?;
            roblox
                .publish_message(
                    &credentials.messaging_key,
                    universe_id,
                    MESSAGING_TOPIC,
                    &message,
                )
                .await?;
        }
        DeliveryPath::Durable => {
            let entry =
                DatastoreEntry::encode(record).map_err(|e| DatastoreError::Encode(e.to_string()))?;
            let stored = roblox
                .write_datastore_entry(
                    &credentials.datastore_key,
                    universe_id,
                    record.player,
                    &entry,
                )
                .await?;
            tracing::debug!(player = record.player, ?stored, "Datastore entry written");
        }
    }
    Ok(())
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ModerationService<R: RobloxApi, S: SettingsStore + UniverseDirectory> {
    roblox: Arc<R>,
    settings: Arc<SettingsService<S>>,
    window: Duration,
}

impl<R: RobloxApi, S: SettingsStore + UniverseDirectory> ModerationService<R, S> {
    pub fn new(roblox: Arc<R>, settings: Arc<SettingsService<S>>, window: Duration) -> Self {
        Self {
            roblox,
            settings,
            window,
        }
    }

    /// Run one request to a terminal state.
    pub async fn execute<U: ModerationSurface>(
        &self,
        request: ModerationRequest,
        surface: &mut U,
    ) -> Result<ModerationOutcome, ModerationError> {
        let Some(universe_id) = UniverseId::parse(&request.universe_id) else {
            tracing::info!(universe = %request.universe_id, "Moderation blocked: universe id is not numeric");
            surface
                .render(ModerationView::InvalidUniverse {
                    universe_id: request.universe_id.clone(),
                })
                .await?;
            return Ok(ModerationOutcome::InvalidUniverse);
        };

        let Some(credentials) = self.settings.credentials().await? else {
            tracing::info!(action = request.action.title(), "Moderation blocked: API keys missing");
            surface.render(ModerationView::ConfigMissing).await?;
            return Ok(ModerationOutcome::ConfigMissing);
        };

        let identifier = PlayerIdentifier::parse(&request.player);
        let target = match self.roblox.validate_player(&identifier).await {
            PlayerLookup::Found(user) => user,
            PlayerLookup::NotFound => {
                tracing::info!(player = %identifier, "Player not found on Roblox");
                surface.render(ModerationView::PlayerNotFound).await?;
                return Ok(ModerationOutcome::ValidationFailed(ValidationFailure::NotFound));
            }
            PlayerLookup::Failed(message) => {
                tracing::warn!(player = %identifier, "Player lookup failed: {}", message);
                surface.render(ModerationView::LookupFailed).await?;
                return Ok(ModerationOutcome::ValidationFailed(ValidationFailure::Error(
                    message,
                )));
            }
        };

        let avatar_url = self.roblox.avatar_url(target.id).await;

        surface
            .render(ModerationView::Prompt {
                action: request.action,
                player: request.player.clone(),
                reason: request.reason.clone(),
                avatar_url: avatar_url.clone(),
            })
            .await?;

        let confirmation = ConfirmationRequest {
            emoji: MODERATION_EMOJI,
            responder: Responder::User(request.requested_by),
            window: Some(self.window),
        };

        match surface.await_confirmation(&confirmation).await {
            ConfirmationOutcome::Decided {
                decision: Decision::Approve,
                ..
            } => {}
            ConfirmationOutcome::Decided {
                decision: Decision::Deny,
                ..
            } => {
                tracing::info!(action = request.action.title(), target = target.id, "Moderation cancelled");
                surface
                    .render(ModerationView::Cancelled {
                        action: request.action,
                    })
                    .await?;
                return Ok(ModerationOutcome::Cancelled);
            }
            ConfirmationOutcome::TimedOut => {
                tracing::info!(action = request.action.title(), target = target.id, "Moderation timed out");
                surface.render(ModerationView::TimedOut).await?;
                return Ok(ModerationOutcome::TimedOut);
            }
            ConfirmationOutcome::Failed(message) => {
                tracing::error!("Error awaiting reactions: {}", message);
                surface.render(ModerationView::CollectionFailed).await?;
                return Ok(ModerationOutcome::CollectionFailed(message));
            }
        }

        let record = request.record(&target, Utc::now().timestamp());
        let error = match dispatch(
            self.roblox.as_ref(),
            &credentials,
            universe_id,
            request.action.delivery(),
            &record,
        )
        .await
        {
            Ok(()) => {
                tracing::info!(
                    action = request.action.title(),
                    target = target.id,
                    universe = %universe_id,
                    "Moderation action delivered"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    action = request.action.title(),
                    target = target.id,
                    universe = %universe_id,
                    "Moderation dispatch failed: {}",
                    e
                );
                Some(e.to_string())
            }
        };

        surface
            .render(ModerationView::Outcome {
                action: request.action,
                target: target.clone(),
                avatar_url,
                error: error.clone(),
            })
            .await?;

        self.mirror_to_log(&request, surface).await;

        Ok(ModerationOutcome::Completed { target, error })
    }

    /// Tell every live server of a universe to shut down. No confirmation.
    pub async fn shutdown<U: ModerationSurface>(
        &self,
        universe_id: &str,
        surface: &mut U,
    ) -> Result<Option<String>, ModerationError> {
        let Some(universe) = UniverseId::parse(universe_id) else {
            surface
                .render(ModerationView::InvalidUniverse {
                    universe_id: universe_id.to_string(),
                })
                .await?;
            return Ok(Some(format!("`{}` is not a universe id", universe_id)));
        };

        let Some(api_key) = self.settings.get(SettingKey::MessagingApiKey).await? else {
            surface.render(ModerationView::ConfigMissing).await?;
            return Ok(Some("API keys are not configured".to_string()));
        };

        let error = match serde_json::to_string(&ShutdownSignal::default()) {
            Ok(message) => self
                .roblox
                .publish_message(&api_key, universe, MESSAGING_TOPIC, &message)
                .await
                .err()
                .map(|e| e.to_string()),
            Err(e) => Some(PublishError::Encode(e.to_string()).to_string()),
        };

        match &error {
            None => tracing::info!(universe = %universe, "Shutdown published"),
            Some(e) => tracing::warn!(universe = %universe, "Shutdown failed: {}", e),
        }

        surface
            .render(ModerationView::Shutdown {
                universe_id: universe.to_string(),
                error: error.clone(),
            })
            .await?;
        Ok(error)
    }

    /// Best-effort: never changes the reported outcome.
    async fn mirror_to_log<U: ModerationSurface>(&self, request: &ModerationRequest, surface: &mut U) {
        let channel_id = match self.settings.log_channel().await {
            Ok(Some(id)) => id,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Could not read log channel setting: {}", e);
                return;
            }
        };

        if let Err(e) = surface.post_audit(channel_id, &request.audit_entry()).await {
            tracing::warn!(channel_id, "Failed to post audit log: {}", e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
