use std::{env, time::Duration};
use tracing::info;

const PRIMARY_PREFIX: &str = "VISU_";
const FALLBACK_PREFIX: &str = "FIREBASE_";

/// Connection settings for the remote realtime database.
///
/// Every field must be non-empty before the remote backend will initialize.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub database_url: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl RemoteConfig {
    /// `VISU_*` wins when complete, then `FIREBASE_*`. When neither is
    /// complete the `VISU_*` set is kept so its gaps get reported.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let primary = Self::from_prefix(PRIMARY_PREFIX, &lookup);
        if primary.is_complete() {
            return primary;
        }

        let fallback = Self::from_prefix(FALLBACK_PREFIX, &lookup);
        if fallback.is_complete() {
            info!("{PRIMARY_PREFIX}* settings incomplete, using {FALLBACK_PREFIX}* settings");
            return fallback;
        }

        primary
    }

    pub fn from_prefix(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(&format!("{prefix}{name}")).unwrap_or_default();
        Self {
            api_key: read("API_KEY"),
            auth_domain: read("AUTH_DOMAIN"),
            database_url: read("DATABASE_URL"),
            project_id: read("PROJECT_ID"),
            storage_bucket: read("STORAGE_BUCKET"),
            messaging_sender_id: read("MESSAGING_SENDER_ID"),
            app_id: read("APP_ID"),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("api_key", &self.api_key),
            ("auth_domain", &self.auth_domain),
            ("database_url", &self.database_url),
            ("project_id", &self.project_id),
            ("storage_bucket", &self.storage_bucket),
            ("messaging_sender_id", &self.messaging_sender_id),
            ("app_id", &self.app_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// What the tracker does when the remote backend fails to initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitFailurePolicy {
    /// Switch to demo data and tell the user.
    #[default]
    FallbackToInMemory,
    /// Stay on the remote backend; every call fails with "not initialized".
    ReportError,
}

impl InitFailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fallback" | "memory" | "demo" => Some(Self::FallbackToInMemory),
            "report" | "error" => Some(Self::ReportError),
            _ => None,
        }
    }
}

/// Timings for the widget session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub startup_delay: Duration,
    pub refresh_interval: Duration,
    pub demo_read_latency: Duration,
    pub demo_write_latency: Duration,
    pub message_lifetime: Duration,
    pub request_timeout: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(1),
            refresh_interval: Duration::from_secs(2 * 60),
            demo_read_latency: Duration::from_millis(300),
            demo_write_latency: Duration::from_millis(200),
            message_lifetime: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Schedule {
    /// Zero is ignored for the refresh interval and the request timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read_u64 =
            |name: &str| lookup(name).and_then(|value| value.trim().parse::<u64>().ok());
        let mut schedule = Self::default();
        if let Some(ms) = read_u64("VISU_STARTUP_DELAY_MS") {
            schedule.startup_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = read_u64("VISU_REFRESH_INTERVAL_SECS").filter(|secs| *secs > 0) {
            schedule.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = read_u64("VISU_DEMO_LATENCY_MS") {
            schedule.demo_read_latency = Duration::from_millis(ms);
            schedule.demo_write_latency = Duration::from_millis(ms);
        }
        if let Some(secs) = read_u64("VISU_REQUEST_TIMEOUT_SECS").filter(|secs| *secs > 0) {
            schedule.request_timeout = Duration::from_secs(secs);
        }
        schedule
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub on_init_failure: InitFailurePolicy,
    pub schedule: Schedule,
    pub port: u16,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let on_init_failure = lookup("VISU_ON_INIT_FAILURE")
            .and_then(|value| InitFailurePolicy::parse(&value))
            .unwrap_or_default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        Self {
            remote: RemoteConfig::from_lookup(&lookup),
            on_init_failure,
            schedule: Schedule::from_lookup(&lookup),
            port,
        }
    }
}
