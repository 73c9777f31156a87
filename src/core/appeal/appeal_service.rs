// Appeal workflow - post an appeal for staff, await one verdict, unban on approval.
//
// Shares the confirmation predicate and the durable dispatch with the
// moderation workflow. NO Discord dependencies here.

use super::appeal_models::{
    AppealOutcome, AppealRequest, AppealView, APPEAL_FAILED_REPLY, APPEAL_INVALID_UNIVERSE_REPLY,
    APPEAL_SUBMITTED_REPLY,
};
use crate::core::confirmation::{
    ConfirmationOutcome, ConfirmationRequest, Decision, Responder, SurfaceError, APPEAL_EMOJI,
};
use crate::core::moderation::{dispatch, DeliveryPath};
use crate::core::roblox::{
    ModerationRecord, PlayerIdentifier, PlayerLookup, RobloxApi, UniverseId,
};
use crate::core::settings::{
    SettingKey, SettingsError, SettingsService, SettingsStore, UniverseDirectory,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AppealError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

// ============================================================================
// SURFACE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait AppealSurface: Send {
    /// Post the application to the staff channel.
    async fn post(&mut self, channel_id: u64, view: AppealView) -> Result<(), SurfaceError>;

    /// Private reply to the submitter.
    async fn acknowledge(&mut self, message: &str) -> Result<(), SurfaceError>;

    async fn await_confirmation(&mut self, request: &ConfirmationRequest) -> ConfirmationOutcome;

    /// Edit the posted application.
    async fn render(&mut self, view: AppealView) -> Result<(), SurfaceError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AppealService<R: RobloxApi, S: SettingsStore + UniverseDirectory> {
    roblox: Arc<R>,
    settings: Arc<SettingsService<S>>,
    review_window: Option<Duration>,
}

impl<R: RobloxApi, S: SettingsStore + UniverseDirectory> AppealService<R, S> {
    pub fn new(
        roblox: Arc<R>,
        settings: Arc<SettingsService<S>>,
        review_window: Option<Duration>,
    ) -> Self {
        Self {
            roblox,
            settings,
            review_window,
        }
    }

    pub fn review_window(&self) -> Option<Duration> {
        self.review_window
    }

    /// Run one appeal from submission to verdict.
    pub async fn handle<U: AppealSurface>(
        &self,
        request: AppealRequest,
        surface: &mut U,
    ) -> Result<AppealOutcome, AppealError> {
        let Some(universe_id) = UniverseId::parse(&request.universe_id) else {
            tracing::info!(submitter = request.submitted_by, universe = %request.universe_id, "Appeal names a non-numeric universe");
            surface.acknowledge(APPEAL_INVALID_UNIVERSE_REPLY).await?;
            return Ok(AppealOutcome::InvalidUniverse);
        };

        // The submitter is always answered, even when settings can't be read.
        let (channel_id, universe_name) = match self.destination(&request).await {
            Ok(destination) => destination,
            Err(e) => {
                tracing::error!(submitter = request.submitted_by, "Could not read appeal settings: {}", e);
                surface.acknowledge(APPEAL_FAILED_REPLY).await?;
                return Err(e.into());
            }
        };

        let Some(channel_id) = channel_id else {
            tracing::warn!(submitter = request.submitted_by, "Appeal received but no appeal channel is configured");
            surface.acknowledge(APPEAL_FAILED_REPLY).await?;
            return Ok(AppealOutcome::NoChannel);
        };

        if let Err(e) = surface
            .post(
                channel_id,
                AppealView::Application {
                    request: request.clone(),
                    universe_name,
                },
            )
            .await
        {
            tracing::error!(channel_id, "Failed to post appeal: {}", e);
            surface.acknowledge(APPEAL_FAILED_REPLY).await?;
            return Ok(AppealOutcome::PostFailed(e.to_string()));
        }

        if let Err(e) = surface.acknowledge(APPEAL_SUBMITTED_REPLY).await {
            tracing::warn!(submitter = request.submitted_by, "Could not acknowledge appeal: {}", e);
        }
        tracing::info!(
            submitter = request.submitted_by,
            universe = %request.universe_id,
            "Appeal posted for review"
        );

        let required_role = self.settings.snowflake(SettingKey::AppealReviewerRole).await?;
        let confirmation = ConfirmationRequest {
            emoji: APPEAL_EMOJI,
            responder: Responder::Reviewer {
                submitter: request.submitted_by,
                required_role,
            },
            window: self.review_window,
        };

        let reviewer_id = match surface.await_confirmation(&confirmation).await {
            ConfirmationOutcome::Decided {
                decision: Decision::Approve,
                actor_id,
            } => actor_id,
            ConfirmationOutcome::Decided {
                decision: Decision::Deny,
                actor_id,
            } => {
                tracing::info!(reviewer = actor_id, username = %request.username, "Appeal declined");
                surface
                    .render(AppealView::Declined {
                        username: request.username,
                        appeal: request.appeal,
                        reviewer_id: actor_id,
                    })
                    .await?;
                return Ok(AppealOutcome::Declined);
            }
            ConfirmationOutcome::TimedOut => {
                tracing::info!(username = %request.username, "Appeal review timed out");
                surface.render(AppealView::TimedOut).await?;
                return Ok(AppealOutcome::TimedOut);
            }
            ConfirmationOutcome::Failed(message) => {
                tracing::error!("Error awaiting appeal reactions: {}", message);
                surface.render(AppealView::CollectionFailed).await?;
                return Ok(AppealOutcome::CollectionFailed(message));
            }
        };

        self.approve(request, universe_id, reviewer_id, surface).await
    }

    /// Staff channel and registered universe name for a submission.
    async fn destination(
        &self,
        request: &AppealRequest,
    ) -> Result<(Option<u64>, Option<String>), SettingsError> {
        let channel_id = self.settings.appeal_channel().await?;
        let universe_name = self.settings.universe_name(&request.universe_id).await?;
        Ok((channel_id, universe_name))
    }

    async fn approve<U: AppealSurface>(
        &self,
        request: AppealRequest,
        universe_id: UniverseId,
        reviewer_id: u64,
        surface: &mut U,
    ) -> Result<AppealOutcome, AppealError> {
        let Some(credentials) = self.settings.credentials().await? else {
            surface.render(AppealView::ConfigMissing).await?;
            return Ok(AppealOutcome::ConfigMissing);
        };

        // The form asks for a username, so digits are a username too.
        let identifier = PlayerIdentifier::Username(request.username.clone());
        let target = match self.roblox.validate_player(&identifier).await {
            PlayerLookup::Found(user) => user,
            PlayerLookup::NotFound => {
                tracing::info!(username = %request.username, "Appeal approved for unknown username");
                surface
                    .render(AppealView::InvalidUsername {
                        username: request.username,
                        appeal: request.appeal,
                    })
                    .await?;
                return Ok(AppealOutcome::InvalidUsername);
            }
            PlayerLookup::Failed(message) => {
                tracing::warn!(username = %request.username, "Appeal lookup failed: {}", message);
                surface.render(AppealView::LookupFailed(message.clone())).await?;
                return Ok(AppealOutcome::LookupFailed(message));
            }
        };

        let record = ModerationRecord::unban(target.id);
        if let Err(e) = dispatch(
            self.roblox.as_ref(),
            &credentials,
            universe_id,
            DeliveryPath::Durable,
            &record,
        )
        .await
        {
            tracing::warn!(target = target.id, "Appeal unban failed: {}", e);
            let error = e.to_string();
            surface
                .render(AppealView::UnbanFailed {
                    target: target.clone(),
                    error: error.clone(),
                })
                .await?;
            return Ok(AppealOutcome::UnbanFailed { target, error });
        }

        tracing::info!(reviewer = reviewer_id, target = target.id, "Appeal approved, player unbanned");
        surface
            .render(AppealView::Approved {
                target: target.clone(),
                appeal: request.appeal,
                reviewer_id,
            })
            .await?;
        Ok(AppealOutcome::Approved(target))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirmation::Actor;
    use crate::core::moderation::moderation_service::tests::{user, MockRobloxApi};
    use crate::core::roblox::{DatastoreError, RecordMethod};
    use crate::core::settings::settings_service::tests::MockSettingsStore;

    const SUBMITTER: u64 = 10;
    const STAFF: u64 = 20;

    #[derive(Default)]
    struct MockAppealSurface {
        posted: Vec<(u64, AppealView)>,
        acknowledgements: Vec<String>,
        views: Vec<AppealView>,
        reactions: Vec<(&'static str, Actor)>,
        fail_post: bool,
        seen_window: Option<Option<Duration>>,
    }

    #[async_trait]
    impl AppealSurface for MockAppealSurface {
        async fn post(&mut self, channel_id: u64, view: AppealView) -> Result<(), SurfaceError> {
            if self.fail_post {
                return Err(SurfaceError("missing access".to_string()));
            }
            self.posted.push((channel_id, view));
            Ok(())
        }

        async fn acknowledge(&mut self, message: &str) -> Result<(), SurfaceError> {
            self.acknowledgements.push(message.to_string());
            Ok(())
        }

        async fn await_confirmation(
            &mut self,
            request: &ConfirmationRequest,
        ) -> ConfirmationOutcome {
            self.seen_window = Some(request.window);
            for (emoji, actor) in &self.reactions {
                if let Some(decision) = request.qualifies(emoji, actor) {
                    return ConfirmationOutcome::Decided {
                        decision,
                        actor_id: actor.user_id,
                    };
                }
            }
            ConfirmationOutcome::TimedOut
        }

        async fn render(&mut self, view: AppealView) -> Result<(), SurfaceError> {
            self.views.push(view);
            Ok(())
        }
    }

    fn configured_store() -> MockSettingsStore {
        let store = MockSettingsStore::with_keys();
        store
            .settings
            .insert(SettingKey::AppealChannel, "700".to_string());
        store
            .universes
            .insert("4242".to_string(), "Main Game".to_string());
        store
    }

    fn service(
        roblox: Arc<MockRobloxApi>,
        store: MockSettingsStore,
    ) -> AppealService<MockRobloxApi, MockSettingsStore> {
        AppealService::new(
            roblox,
            Arc::new(SettingsService::new(store)),
            Some(Duration::from_secs(86_400)),
        )
    }

    fn appeal() -> AppealRequest {
        AppealRequest {
            universe_id: "4242".to_string(),
            username: "Builderman".to_string(),
            appeal: "I was wrongly banned".to_string(),
            submitted_by: SUBMITTER,
        }
    }

    fn surface(reactions: Vec<(&'static str, Actor)>) -> MockAppealSurface {
        MockAppealSurface {
            reactions,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_approved_appeal_writes_unban() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(vec![("✅", user(STAFF))]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert!(matches!(outcome, AppealOutcome::Approved(ref u) if u.id == 123));
        assert_eq!(surface.posted.len(), 1);
        assert_eq!(surface.posted[0].0, 700);
        match &surface.posted[0].1 {
            AppealView::Application { universe_name, .. } => {
                assert_eq!(universe_name.as_deref(), Some("Main Game"))
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(surface.acknowledgements, vec![APPEAL_SUBMITTED_REPLY]);

        let written = roblox.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].1, "123");
        let record: ModerationRecord = serde_json::from_str(&written[0].2.body).unwrap();
        assert_eq!(record.method, RecordMethod::Unban);
        assert_eq!(roblox.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_username_never_writes() {
        let roblox = Arc::new(MockRobloxApi::with_lookup(PlayerLookup::NotFound));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(vec![("✅", user(STAFF))]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert_eq!(outcome, AppealOutcome::InvalidUsername);
        assert_eq!(
            surface.views,
            vec![AppealView::InvalidUsername {
                username: "Builderman".to_string(),
                appeal: "I was wrongly banned".to_string(),
            }]
        );
        assert_eq!(roblox.write_count(), 0);
    }

    #[tokio::test]
    async fn test_numeric_username_is_looked_up_by_name() {
        let roblox = Arc::new(MockRobloxApi::found(777, "20240101"));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(vec![("✅", user(STAFF))]);
        let mut request = appeal();
        request.username = "20240101".to_string();

        let outcome = service.handle(request, &mut surface).await.unwrap();

        assert!(matches!(outcome, AppealOutcome::Approved(ref u) if u.id == 777));
        assert_eq!(
            *roblox.looked_up.lock().unwrap(),
            vec![PlayerIdentifier::Username("20240101".to_string())]
        );
        assert_eq!(roblox.written.lock().unwrap()[0].1, "777");
    }

    #[tokio::test]
    async fn test_non_numeric_universe_is_refused_up_front() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(vec![("✅", user(STAFF))]);
        let mut request = appeal();
        request.universe_id =
            "4242/standard-datastores/datastore/entries/entry?datastoreName=Other&entryKey=1#"
                .to_string();

        let outcome = service.handle(request, &mut surface).await.unwrap();

        assert_eq!(outcome, AppealOutcome::InvalidUniverse);
        assert_eq!(surface.acknowledgements, vec![APPEAL_INVALID_UNIVERSE_REPLY]);
        assert!(surface.posted.is_empty());
        assert!(roblox.looked_up.lock().unwrap().is_empty());
        assert_eq!(roblox.write_count(), 0);
        assert_eq!(roblox.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_settings_still_answer_submitter() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let store = MockSettingsStore {
            unavailable: true,
            ..Default::default()
        };
        let service = service(Arc::clone(&roblox), store);
        let mut surface = surface(vec![("✅", user(STAFF))]);

        let result = service.handle(appeal(), &mut surface).await;

        assert!(matches!(result, Err(AppealError::Settings(_))));
        assert_eq!(surface.acknowledgements, vec![APPEAL_FAILED_REPLY]);
        assert!(surface.posted.is_empty());
    }

    #[tokio::test]
    async fn test_submitter_cannot_approve_own_appeal() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(vec![("✅", user(SUBMITTER)), ("❌", user(STAFF))]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert_eq!(outcome, AppealOutcome::Declined);
        assert!(matches!(
            surface.views.last(),
            Some(AppealView::Declined { reviewer_id: STAFF, .. })
        ));
        assert_eq!(roblox.write_count(), 0);
    }

    #[tokio::test]
    async fn test_reviewer_role_is_enforced() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let store = configured_store();
        store
            .settings
            .insert(SettingKey::AppealReviewerRole, "900".to_string());
        let service = service(Arc::clone(&roblox), store);
        let moderator = Actor {
            user_id: 30,
            is_bot: false,
            role_ids: vec![900],
        };
        let mut surface = surface(vec![("✅", user(STAFF)), ("✅", moderator)]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert!(matches!(outcome, AppealOutcome::Approved(_)));
        assert!(matches!(
            surface.views.last(),
            Some(AppealView::Approved { reviewer_id: 30, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_channel_tells_submitter() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let service = service(Arc::clone(&roblox), MockSettingsStore::with_keys());
        let mut surface = surface(vec![("✅", user(STAFF))]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert_eq!(outcome, AppealOutcome::NoChannel);
        assert_eq!(surface.acknowledgements, vec![APPEAL_FAILED_REPLY]);
        assert!(surface.posted.is_empty());
    }

    #[tokio::test]
    async fn test_log_channel_is_the_fallback() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let store = MockSettingsStore::with_keys();
        store
            .settings
            .insert(SettingKey::LogChannel, "555".to_string());
        let service = service(Arc::clone(&roblox), store);
        let mut surface = surface(Vec::new());

        service.handle(appeal(), &mut surface).await.unwrap();

        assert_eq!(surface.posted[0].0, 555);
        match &surface.posted[0].1 {
            AppealView::Application { universe_name, .. } => assert_eq!(universe_name, &None),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_post_failure_is_reported() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = MockAppealSurface {
            fail_post: true,
            ..Default::default()
        };

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert!(matches!(outcome, AppealOutcome::PostFailed(_)));
        assert_eq!(surface.acknowledgements, vec![APPEAL_FAILED_REPLY]);
    }

    #[tokio::test]
    async fn test_review_window_is_bounded_and_times_out() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(Vec::new());

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert_eq!(outcome, AppealOutcome::TimedOut);
        assert_eq!(surface.seen_window, Some(Some(Duration::from_secs(86_400))));
        assert_eq!(surface.views, vec![AppealView::TimedOut]);
        assert_eq!(roblox.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unban_failure_is_visible() {
        let mut api = MockRobloxApi::found(123, "Builderman");
        api.datastore_result = Err(DatastoreError::Status {
            status: 403,
            body: "forbidden".to_string(),
        });
        let roblox = Arc::new(api);
        let service = service(Arc::clone(&roblox), configured_store());
        let mut surface = surface(vec![("✅", user(STAFF))]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert!(matches!(outcome, AppealOutcome::UnbanFailed { .. }));
        assert!(matches!(
            surface.views.last(),
            Some(AppealView::UnbanFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_approval_without_keys_is_config_missing() {
        let roblox = Arc::new(MockRobloxApi::found(123, "Builderman"));
        let store = MockSettingsStore::default();
        store
            .settings
            .insert(SettingKey::AppealChannel, "700".to_string());
        let service = service(Arc::clone(&roblox), store);
        let mut surface = surface(vec![("✅", user(STAFF))]);

        let outcome = service.handle(appeal(), &mut surface).await.unwrap();

        assert_eq!(outcome, AppealOutcome::ConfigMissing);
        assert_eq!(roblox.write_count(), 0);
    }
}
