use crate::display::DisplayState;
use crate::tracker::Tracker;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
    pub display: Arc<DisplayState>,
}

impl AppState {
    pub fn new(tracker: Arc<Tracker>, display: Arc<DisplayState>) -> Self {
        Self { tracker, display }
    }
}
