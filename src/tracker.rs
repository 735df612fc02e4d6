use crate::backend::{remote, Backend, BackendError, BackendKind, InMemoryBackend, RemoteBackend};
use crate::config::{AppConfig, InitFailurePolicy};
use crate::counters::{CounterKeys, Language};
use crate::display::{format_number, format_timestamp, ids, DisplaySink};
use crate::stats::{FetchResult, StatsReport};
use chrono::Local;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// Routes counter operations to whichever backend is currently selected
/// and reports the outcome to a display sink.
pub struct Tracker {
    remote: Arc<dyn Backend>,
    memory: Arc<dyn Backend>,
    selection: RwLock<BackendKind>,
    keys: CounterKeys,
    sink: Arc<dyn DisplaySink>,
}

impl Tracker {
    /// Builds both backends from configuration and initializes the remote one.
    /// `config.on_init_failure` decides what happens when that fails.
    pub fn connect(config: &AppConfig, keys: CounterKeys, sink: Arc<dyn DisplaySink>) -> Self {
        let schedule = &config.schedule;
        let remote = RemoteBackend::new(config.remote.clone(), schedule.request_timeout);
        let memory = InMemoryBackend::with_demo_data(
            &keys,
            schedule.demo_read_latency,
            schedule.demo_write_latency,
        );

        let initial = match remote.initialize() {
            Ok(()) => BackendKind::Remote,
            Err(_) => match config.on_init_failure {
                InitFailurePolicy::FallbackToInMemory => {
                    warn!("remote store unavailable, falling back to demo data");
                    sink.set_message(
                        &format!("Could not connect to {}. Using demo data.", remote::NAME),
                        true,
                    );
                    BackendKind::Memory
                }
                InitFailurePolicy::ReportError => BackendKind::Remote,
            },
        };

        Self::with_backends(Arc::new(remote), Arc::new(memory), initial, keys, sink)
    }

    pub fn with_backends(
        remote: Arc<dyn Backend>,
        memory: Arc<dyn Backend>,
        initial: BackendKind,
        keys: CounterKeys,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        let tracker = Self {
            remote,
            memory,
            selection: RwLock::new(initial),
            keys,
            sink,
        };
        tracker
            .sink
            .set_active_backend(initial, tracker.backend(initial).name());
        tracker
    }

    pub fn active_backend(&self) -> BackendKind {
        *self.selection.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn keys(&self) -> &CounterKeys {
        &self.keys
    }

    fn backend(&self, kind: BackendKind) -> &dyn Backend {
        match kind {
            BackendKind::Remote => self.remote.as_ref(),
            BackendKind::Memory => self.memory.as_ref(),
        }
    }

    async fn get(&self, key: &str) -> FetchResult {
        self.backend(self.active_backend()).get(key).await
    }

    async fn increment(&self, key: &str) -> Result<u64, BackendError> {
        self.backend(self.active_backend()).increment(key, 1).await
    }

    /// Reads every displayed counter at once. A failed read shows as 0 and
    /// flips the status indicators offline; it never cancels the others.
    pub async fn load_all_stats(&self) -> StatsReport {
        let kind = self.active_backend();
        let name = self.backend(kind).name();

        self.sink.set_loading(true);
        self.sink.set_message(&format!("Loading statistics via {name}..."), false);

        let (total, today, discord, pt, en, tr) = tokio::join!(
            self.get(&self.keys.total_visits),
            self.get(&self.keys.today_visits),
            self.get(&self.keys.discord_clicks),
            self.get(Language::Pt.key()),
            self.get(Language::En.key()),
            self.get(Language::Tr.key()),
        );

        let keyed = [
            (self.keys.total_visits.as_str(), &total),
            (self.keys.today_visits.as_str(), &today),
            (self.keys.discord_clicks.as_str(), &discord),
            (Language::Pt.key(), &pt),
            (Language::En.key(), &en),
            (Language::Tr.key(), &tr),
        ];
        for (key, result) in keyed {
            if let Err(err) = result {
                warn!(key, backend = name, "failed to read counter: {err}");
            }
        }

        let report =
            StatsReport::from_results(kind, name, [&total, &today, &discord, &pt, &en, &tr]);

        // A switch during the reads owns the display now.
        if self.active_backend() != kind {
            debug!(backend = name, "dropping stats from a superseded backend");
            return report;
        }

        self.render(&report);
        self.sink.set_loading(false);
        report
    }

    fn render(&self, report: &StatsReport) {
        let counters = [
            (ids::TOTAL_VISITS, report.total_visits),
            (ids::TODAY_VISITS, report.today_visits),
            (ids::DISCORD_CLICKS, report.discord_clicks),
            (ids::PT_COUNT, report.lang_pt),
            (ids::EN_COUNT, report.lang_en),
            (ids::TR_COUNT, report.lang_tr),
        ];
        for (id, value) in counters {
            self.sink.set_counter_text(id, &format_number(value));
        }

        let shares = report.shares;
        self.sink.set_progress_bars(shares.pt, shares.en, shares.tr);

        for id in ids::STATUSES {
            self.sink.set_status(id, report.all_succeeded);
        }
        self.sink.set_last_update(&format_timestamp(Local::now()));
        self.sink.set_active_backend(report.backend, report.backend_name);

        if report.all_succeeded {
            self.sink.set_message(
                &format!("Statistics loaded via {}!", report.backend_name),
                false,
            );
        } else {
            self.sink.set_message(
                &format!("Error loading statistics via {}", report.backend_name),
                true,
            );
        }
    }

    /// Takes effect for the next operation, then reloads everything.
    pub async fn switch_backend(&self, kind: BackendKind) -> StatsReport {
        *self.selection.write().unwrap_or_else(PoisonError::into_inner) = kind;
        let name = self.backend(kind).name();
        info!(backend = name, "switched backend");

        self.sink.set_active_backend(kind, name);
        self.sink.set_message(&format!("Backend switched to {name}"), false);
        self.load_all_stats().await
    }

    pub async fn track_visit(&self) {
        let result = async {
            self.increment(&self.keys.total_visits).await?;
            self.increment(&self.keys.today_visits).await?;
            Ok::<_, BackendError>(())
        }
        .await;

        match result {
            Ok(()) => info!("visit tracked"),
            Err(err) => error!("failed to track visit: {err}"),
        }
    }

    /// Unknown language codes are ignored.
    pub async fn track_language_change(&self, code: &str) {
        let Some(lang) = Language::parse(code) else {
            debug!(code, "ignoring unknown language");
            return;
        };

        match self.increment(lang.key()).await {
            Ok(_) => info!(lang = lang.code(), "language change tracked"),
            Err(err) => error!(lang = lang.code(), "failed to track language change: {err}"),
        }
    }

    pub async fn track_discord_click(&self) {
        match self.increment(&self.keys.discord_clicks).await {
            Ok(_) => info!("discord click tracked"),
            Err(err) => error!("failed to track discord click: {err}"),
        }
    }
}
