use crate::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ProgressBars {
    pub pt: f64,
    pub en: f64,
    pub tr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Everything the widget page renders, keyed by element id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplaySnapshot {
    pub counters: BTreeMap<String, String>,
    pub statuses: BTreeMap<String, bool>,
    pub progress: ProgressBars,
    pub message: Option<StatusMessage>,
    pub last_update: Option<String>,
    pub active_backend: Option<BackendKind>,
    pub backend_label: String,
    pub loading: bool,
}

#[derive(Debug, Deserialize)]
pub struct SwitchBackendRequest {
    pub backend: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub lang: String,
}
