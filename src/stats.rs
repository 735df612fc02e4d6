use crate::backend::{BackendError, BackendKind};
use serde::Serialize;

/// Outcome of a single read in a batch load.
pub type FetchResult = Result<u64, BackendError>;

/// Share of each tracked language among pt + en + tr, in percent.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct LanguageShares {
    pub pt: f64,
    pub en: f64,
    pub tr: f64,
}

impl LanguageShares {
    pub fn compute(pt: u64, en: u64, tr: u64) -> Self {
        let total = pt as f64 + en as f64 + tr as f64;
        if total == 0.0 {
            return Self::default();
        }
        Self {
            pt: pt as f64 / total * 100.0,
            en: en as f64 / total * 100.0,
            tr: tr as f64 / total * 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub backend: BackendKind,
    pub backend_name: &'static str,
    pub total_visits: u64,
    pub today_visits: u64,
    pub discord_clicks: u64,
    pub lang_pt: u64,
    pub lang_en: u64,
    pub lang_tr: u64,
    pub all_succeeded: bool,
    pub shares: LanguageShares,
}

impl StatsReport {
    /// Failed reads count as 0 and mark the batch as not fully successful.
    /// Order: total, today, discord, pt, en, tr.
    pub fn from_results(
        backend: BackendKind,
        backend_name: &'static str,
        results: [&FetchResult; 6],
    ) -> Self {
        let all_succeeded = results.iter().all(|result| result.is_ok());
        let [total_visits, today_visits, discord_clicks, lang_pt, lang_en, lang_tr] =
            results.map(|result| *result.as_ref().unwrap_or(&0));

        Self {
            backend,
            backend_name,
            total_visits,
            today_visits,
            discord_clicks,
            lang_pt,
            lang_en,
            lang_tr,
            all_succeeded,
            shares: LanguageShares::compute(lang_pt, lang_en, lang_tr),
        }
    }
}
