//! Application composition root.
//!
//! Owns every piece of state explicitly (registry, notifier, selector,
//! guard, settings) and wires the recurring tasks to the shutdown
//! coordinator. Nothing here is a global.

use std::sync::Arc;

use crate::channel::ChannelRegistry;
use crate::config::SettingsStore;
use crate::events::Notifier;
use crate::feed::FeedPoller;
use crate::guard::TransitionGuard;
use crate::notify::NotificationLog;
use crate::poller::ProbePoller;
use crate::probe::HttpTransport;
use crate::selector::FailoverSelector;
use crate::shutdown::ShutdownCoordinator;

pub struct App {
    registry: Arc<ChannelRegistry>,
    notifier: Arc<Notifier>,
    selector: Arc<FailoverSelector>,
    guard: Arc<TransitionGuard>,
    notifications: Arc<NotificationLog>,
    settings: SettingsStore,
    transport: Arc<HttpTransport>,
    shutdown: ShutdownCoordinator,
}

impl App {
    /// Assemble the full component graph from loaded configuration.
    pub fn new(settings: SettingsStore, transport: Arc<HttpTransport>) -> Self {
        let config = settings.get();
        let registry = Arc::new(ChannelRegistry::new(config.channel_set()));
        let notifier = Arc::new(Notifier::new());

        let notifications = Arc::new(NotificationLog::new(settings.clone()));
        let notifications_sink: Arc<dyn crate::events::EventSink> = notifications.clone();
        notifier.subscribe(notifications_sink);

        let selector_transport: Arc<dyn crate::probe::ProbeTransport> = transport.clone();
        let selector = Arc::new(FailoverSelector::new(
            Arc::clone(&registry),
            Arc::clone(&notifier),
            selector_transport,
        ));
        let guard = Arc::new(TransitionGuard::new(
            Arc::clone(&registry),
            Arc::clone(&notifier),
            Arc::clone(&selector),
        ));

        Self {
            registry,
            notifier,
            selector,
            guard,
            notifications,
            settings,
            transport,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn selector(&self) -> &Arc<FailoverSelector> {
        &self.selector
    }

    pub fn guard(&self) -> &Arc<TransitionGuard> {
        &self.guard
    }

    pub fn notifications(&self) -> &Arc<NotificationLog> {
        &self.notifications
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Run until interrupted: spawn the probe and feed pollers, wait for
    /// ctrl-c, then drain both tasks.
    pub async fn run(&self) -> anyhow::Result<()> {
        let probe_poller = ProbePoller::spawn(
            Arc::clone(&self.selector),
            self.settings.clone(),
            self.shutdown.handle(),
        );
        let feed_source: Arc<dyn crate::probe::MessageSource> = self.transport.clone();
        let feed_poller = FeedPoller::spawn(
            feed_source,
            Arc::clone(&self.registry),
            self.settings.clone(),
            self.shutdown.handle(),
        );

        tokio::signal::ctrl_c().await?;
        self.shutdown.signal();

        probe_poller.join().await;
        feed_poller.join().await;
        Ok(())
    }
}
