use crate::backend::BackendKind;
use crate::models::{DisplaySnapshot, ProgressBars, StatusMessage};
use chrono::{DateTime, Local};
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tokio::time::Instant;

/// Element ids the widget renders into.
pub mod ids {
    pub const TOTAL_VISITS: &str = "totalVisits";
    pub const TODAY_VISITS: &str = "todayVisits";
    pub const DISCORD_CLICKS: &str = "discordClicks";
    pub const PT_COUNT: &str = "ptCount";
    pub const EN_COUNT: &str = "enCount";
    pub const TR_COUNT: &str = "trCount";

    pub const TOTAL_STATUS: &str = "totalStatus";
    pub const TODAY_STATUS: &str = "todayStatus";
    pub const DISCORD_STATUS: &str = "discordStatus";

    pub const STATUSES: [&str; 3] = [TOTAL_STATUS, TODAY_STATUS, DISCORD_STATUS];
}

/// Where the tracker sends what it wants shown.
pub trait DisplaySink: Send + Sync {
    fn set_counter_text(&self, id: &str, text: &str);
    fn set_status(&self, id: &str, online: bool);
    /// Percentages in `0.0..=100.0`.
    fn set_progress_bars(&self, pt: f64, en: f64, tr: f64);
    /// Transient banner; the sink clears it after its message lifetime.
    fn set_message(&self, text: &str, is_error: bool);
    fn set_last_update(&self, text: &str);
    fn set_active_backend(&self, kind: BackendKind, label: &str);
    fn set_loading(&self, loading: bool);
}

struct View {
    snapshot: DisplaySnapshot,
    message_expires: Option<Instant>,
}

/// View model behind the browser page.
pub struct DisplayState {
    view: Mutex<View>,
    message_lifetime: Duration,
}

impl DisplayState {
    pub fn new(message_lifetime: Duration) -> Self {
        Self {
            view: Mutex::new(View {
                snapshot: DisplaySnapshot::default(),
                message_expires: None,
            }),
            message_lifetime,
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        let mut view = self.lock();
        if view.message_expires.is_some_and(|at| Instant::now() >= at) {
            view.snapshot.message = None;
            view.message_expires = None;
        }
        view.snapshot.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, View> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplaySink for DisplayState {
    fn set_counter_text(&self, id: &str, text: &str) {
        self.lock().snapshot.counters.insert(id.to_string(), text.to_string());
    }

    fn set_status(&self, id: &str, online: bool) {
        self.lock().snapshot.statuses.insert(id.to_string(), online);
    }

    fn set_progress_bars(&self, pt: f64, en: f64, tr: f64) {
        self.lock().snapshot.progress = ProgressBars { pt, en, tr };
    }

    fn set_message(&self, text: &str, is_error: bool) {
        let mut view = self.lock();
        view.snapshot.message = Some(StatusMessage {
            text: text.to_string(),
            is_error,
        });
        view.message_expires = Some(Instant::now() + self.message_lifetime);
    }

    fn set_last_update(&self, text: &str) {
        self.lock().snapshot.last_update = Some(text.to_string());
    }

    fn set_active_backend(&self, kind: BackendKind, label: &str) {
        let mut view = self.lock();
        view.snapshot.active_backend = Some(kind);
        view.snapshot.backend_label = label.to_string();
    }

    fn set_loading(&self, loading: bool) {
        self.lock().snapshot.loading = loading;
    }
}

/// Groups thousands with `.`, e.g. `3500` -> `3.500`.
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn numbers_are_grouped_by_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(85), "85");
        assert_eq!(format_number(3500), "3.500");
        assert_eq!(format_number(1_234_567), "1.234.567");
    }

    #[test]
    fn timestamp_is_day_first() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 14, 3, 9).unwrap();
        assert_eq!(format_timestamp(at), "05/03/2024 14:03:09");
    }

    #[tokio::test(start_paused = true)]
    async fn message_clears_after_lifetime() {
        let display = DisplayState::new(Duration::from_secs(5));
        display.set_message("Statistics loaded", false);
        assert_eq!(
            display.snapshot().message.map(|message| message.text),
            Some("Statistics loaded".to_string())
        );

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert!(display.snapshot().message.is_some());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(display.snapshot().message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_restarts_lifetime() {
        let display = DisplayState::new(Duration::from_secs(5));
        display.set_message("first", false);
        tokio::time::advance(Duration::from_secs(4)).await;
        display.set_message("second", true);
        tokio::time::advance(Duration::from_secs(4)).await;

        let message = display.snapshot().message.expect("message expired early");
        assert_eq!(message.text, "second");
        assert!(message.is_error);
    }
}
