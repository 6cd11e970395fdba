use std::sync::Arc;
use std::time::Duration;

use crate::common::{ChannelError, ChannelState, Credential, StorageError};
use crate::config::AppConfig;
use crate::feed::{FeedPhase, FeedSource, PaginationController, ProximityTracker, Trigger, Viewport};
use crate::network::RealtimeChannel;
use crate::session::SessionStore;

/// Everything the home view drives, without the view itself: the session,
/// the feed with its proximity tracker, and the chat channel while the panel
/// is open.
pub struct Workspace<S: FeedSource> {
    session: SessionStore,
    feed: PaginationController<S>,
    proximity: ProximityTracker,
    chat: Option<RealtimeChannel>,
    chat_url: String,
    connect_timeout: Duration,
}

impl<S: FeedSource> Workspace<S> {
    pub fn new(session: SessionStore, source: Arc<S>, config: &AppConfig) -> Self {
        Self {
            session,
            feed: PaginationController::new(source, config.page_size),
            proximity: ProximityTracker::new(config.proximity_threshold_px),
            chat: None,
            chat_url: config.chat_url.clone(),
            connect_timeout: config.connect_timeout(),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn feed(&self) -> &PaginationController<S> {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut PaginationController<S> {
        &mut self.feed
    }

    pub fn chat(&self) -> Option<&RealtimeChannel> {
        self.chat.as_ref()
    }

    pub fn sign_in(&mut self, credential: Credential) -> Result<(), StorageError> {
        self.session.set_credential(credential)
    }

    /// Applies finished page fetches and chat socket events.
    pub fn poll(&mut self) {
        self.feed.poll_completions();
        if let Some(channel) = self.chat.as_mut() {
            channel.poll_events();
        }
    }

    /// Starts the first page once the feed is empty and idle.
    pub fn ensure_feed_started(&mut self) -> Option<Trigger> {
        let state = self.feed.state();
        (state.items.is_empty() && state.phase == FeedPhase::Idle).then(|| self.feed.load_next())
    }

    /// Feeds the latest scroll metrics to the proximity tracker and loads the
    /// next page when the end of the feed comes into reach.
    pub fn observe_viewport(&mut self, viewport: Viewport) -> Option<Trigger> {
        self.proximity
            .observe(viewport)
            .then(|| self.feed.on_proximity_crossed())
    }

    /// Opens the chat channel, creating it on first use. Must be called from
    /// within a tokio runtime.
    pub fn open_chat(&mut self) {
        let url = &self.chat_url;
        let connect_timeout = self.connect_timeout;
        self.chat
            .get_or_insert_with(|| RealtimeChannel::new(url.clone(), connect_timeout))
            .open();
    }

    /// Drops the channel from the workspace and releases its socket on a
    /// background task.
    pub fn close_chat(&mut self) {
        if let Some(mut channel) = self.chat.take() {
            tokio::spawn(async move {
                channel.close().await;
            });
        }
    }

    /// Sends the draft when the channel is open. The draft is only cleared
    /// once the channel accepted it; otherwise it is left for another try.
    pub fn send_chat(&mut self, draft: &mut String) -> Result<Option<u64>, ChannelError> {
        if draft.trim().is_empty() {
            return Ok(None);
        }
        let Some(channel) = self.chat.as_mut() else {
            return Err(ChannelError::NotConnected(ChannelState::Closed));
        };
        let sequence = channel.send(draft.as_str())?;
        draft.clear();
        Ok(Some(sequence))
    }

    /// Clears the credential, closes the chat and restarts the feed.
    ///
    /// Nothing else changes when the credential cannot be removed.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.session.clear_credential()?;
        self.close_chat();
        self.feed.reset();
        self.proximity.reset();
        log::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{FeedPage, FetchError, Post};
    use crate::storage::LocalStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Ten posts per page, forever.
    #[derive(Default)]
    struct EndlessSource {
        invalidations: AtomicUsize,
    }

    #[async_trait]
    impl FeedSource for EndlessSource {
        async fn fetch_page(&self, page_number: u32, page_size: u32) -> Result<FeedPage, FetchError> {
            let first = u64::from((page_number - 1) * page_size) + 1;
            let items = (first..first + u64::from(page_size))
                .map(|id| Post {
                    id,
                    title: format!("Post {id}"),
                    body: String::new(),
                })
                .collect();
            Ok(FeedPage { page_number, items })
        }

        fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn workspace(source: Arc<EndlessSource>) -> Workspace<EndlessSource> {
        let session = SessionStore::load(LocalStore::in_memory().unwrap()).unwrap();
        let config = AppConfig {
            chat_url: "ws://127.0.0.1:9/ws".into(),
            ..AppConfig::default()
        };
        Workspace::new(session, source, &config)
    }

    fn near_end(content_height: f32) -> Viewport {
        Viewport {
            offset: content_height,
            visible_height: 600.0,
            content_height,
        }
    }

    #[tokio::test]
    async fn logout_tears_down_the_home_view() {
        let source = Arc::new(EndlessSource::default());
        let mut workspace = workspace(source.clone());
        workspace
            .sign_in(Credential::new("t1", "alice"))
            .unwrap();

        assert_eq!(workspace.ensure_feed_started(), Some(Trigger::Started { page: 1 }));
        workspace.feed_mut().next_completion().await;
        assert_eq!(
            workspace.observe_viewport(near_end(1000.0)),
            Some(Trigger::Started { page: 2 })
        );
        workspace.feed_mut().next_completion().await;
        assert_eq!(workspace.feed().items().len(), 20);

        workspace.open_chat();
        assert_eq!(
            workspace.chat().map(RealtimeChannel::state),
            Some(ChannelState::Connecting)
        );

        workspace.logout().unwrap();

        assert!(!workspace.session().is_authenticated());
        assert!(workspace.chat().is_none());
        assert!(workspace.feed().items().is_empty());
        assert_eq!(workspace.feed().state().next_page, 1);
        assert_eq!(workspace.feed().state().phase, FeedPhase::Idle);
        assert_eq!(source.invalidations.load(Ordering::SeqCst), 1);
        // the tracker forgot it was near the end, so the same position fires again
        assert_eq!(
            workspace.observe_viewport(near_end(1000.0)),
            Some(Trigger::Started { page: 1 })
        );
    }

    #[test]
    fn unsent_draft_survives_a_closed_channel() {
        let mut workspace = workspace(Arc::new(EndlessSource::default()));
        let mut draft = String::from("hi");

        assert_eq!(
            workspace.send_chat(&mut draft),
            Err(ChannelError::NotConnected(ChannelState::Closed))
        );
        assert_eq!(draft, "hi");
    }

    #[tokio::test]
    async fn unsent_draft_survives_a_connecting_channel() {
        let mut workspace = workspace(Arc::new(EndlessSource::default()));
        workspace.open_chat();
        let mut draft = String::from("hi");

        assert_eq!(
            workspace.send_chat(&mut draft),
            Err(ChannelError::NotConnected(ChannelState::Connecting))
        );
        assert_eq!(draft, "hi");
        assert!(workspace.chat().is_some_and(|chat| chat.transcript().is_empty()));

        let mut blank = String::from("   ");
        assert_eq!(workspace.send_chat(&mut blank), Ok(None));
        assert_eq!(blank, "   ");
        workspace.close_chat();
    }
}
