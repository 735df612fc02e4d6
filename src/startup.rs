use crate::config::Schedule;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Runs the widget session: after the startup delay, count the visit and load
/// the stats, then reload them on every refresh interval. Never returns.
pub fn spawn(tracker: Arc<Tracker>, schedule: Schedule) -> JoinHandle<()> {
    tokio::spawn(run(tracker, schedule))
}

pub async fn run(tracker: Arc<Tracker>, schedule: Schedule) {
    sleep(schedule.startup_delay).await;
    tracker.track_visit().await;
    tracker.load_all_stats().await;

    let mut refresh = interval_at(
        Instant::now() + schedule.refresh_interval,
        schedule.refresh_interval,
    );
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        refresh.tick().await;
        debug!("refreshing statistics");
        tracker.load_all_stats().await;
    }
}
