use std::{sync::Arc, time::Duration};

use console_interface::{PollState, StatusSource};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use super::state::StateCell;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
/// Longest supported interval. Longer values are clamped so timer deadlines
/// stay representable.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Periodically fetches the platform status and publishes a [`PollState`].
///
/// The first fetch is issued by [`StatusPoller::start`]; once it resolves, a
/// timer re-issues it every `interval`. Fetches never overlap: the timer is
/// re-armed when a fetch resolves, so a slow fetch pushes the next tick back
/// instead of queueing one. After [`StatusPoller::stop`] returns, the
/// published state no longer changes.
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    interval: Duration,
    state: Arc<StateCell<PollState>>,
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        Self {
            source,
            interval: interval.min(MAX_POLL_INTERVAL),
            state: Arc::new(StateCell::default()),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PollState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Enters `Loading` and spawns the polling task. Must be called from
    /// within a tokio runtime. No-op while already running.
    pub fn start(&mut self) {
        if self.task.is_some() {
            debug!(target: "status_poller", "poller already running");
            return;
        }

        let epoch = self.state.begin_epoch();
        self.state.set_in_epoch(epoch, PollState::Loading);

        info!(
            target: "status_poller",
            interval_secs = self.interval.as_secs(),
            "starting status poller"
        );
        self.task = Some(tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            Arc::clone(&self.state),
            epoch,
            self.interval,
        )));
    }

    pub fn stop(&mut self) {
        self.state.begin_epoch();
        if let Some(task) = self.task.take() {
            task.abort();
            info!(target: "status_poller", "status poller stopped");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    state: Arc<StateCell<PollState>>,
    epoch: u64,
    period: Duration,
) {
    if !poll_once(source.as_ref(), &state, epoch).await {
        return;
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !state.set_in_epoch(epoch, PollState::Loading) {
            return;
        }
        if !poll_once(source.as_ref(), &state, epoch).await {
            return;
        }
        ticker.reset();
    }
}

/// Runs one fetch and publishes its outcome. Returns `false` once the epoch is stale.
async fn poll_once(source: &dyn StatusSource, state: &StateCell<PollState>, epoch: u64) -> bool {
    let next = match source.fetch_status().await {
        Ok(snapshot) => {
            debug!(
                target: "status_poller",
                level = snapshot.level().as_str(),
                components = snapshot.components.len(),
                "status fetched"
            );
            PollState::Ready(snapshot)
        }
        Err(err) => {
            warn!(target: "status_poller", error = %err, "status fetch failed");
            PollState::Error(err.to_string())
        }
    };
    state.set_in_epoch(epoch, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_interface::{
        ComponentStatus, FetchError, Indicator, MockStatusSource, StatusSnapshot,
    };
    use tokio::time::sleep;

    fn snapshot(indicator: Indicator, description: &str) -> StatusSnapshot {
        StatusSnapshot::new(
            indicator,
            description,
            vec![ComponentStatus::new("API", "degraded")],
        )
    }

    async fn until_called(source: &MockStatusSource, calls: usize) {
        while source.calls() < calls {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initial_fetch_reaches_ready() {
        let source = Arc::new(MockStatusSource::new());
        source.push_result(Ok(snapshot(Indicator::Major, "Partial outage")));

        let mut poller = StatusPoller::new(source.clone(), DEFAULT_POLL_INTERVAL);
        let mut rx = poller.subscribe();
        poller.start();
        assert!(poller.state().is_loading());

        let state = rx
            .wait_for(|state| state.snapshot().is_some())
            .await
            .expect("poller alive")
            .clone();
        let snapshot = state.snapshot().expect("snapshot");
        assert_eq!(snapshot.headline(), "Major Service Outage");
        assert_eq!(snapshot.description, "Partial outage");
        assert_eq!(source.calls(), 1);

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn failure_stays_error_until_next_tick() {
        let source = Arc::new(MockStatusSource::new());
        source.push_result(Err(FetchError::HttpStatus { status: 503 }));
        let held = source.hold_next();

        let mut poller = StatusPoller::new(source.clone(), DEFAULT_POLL_INTERVAL);
        let mut rx = poller.subscribe();
        poller.start();

        let message = rx
            .wait_for(|state| state.error().is_some())
            .await
            .expect("poller alive")
            .error()
            .map(str::to_string);
        assert_eq!(message.as_deref(), Some("status endpoint returned HTTP 503"));

        sleep(DEFAULT_POLL_INTERVAL - Duration::from_secs(1)).await;
        assert!(poller.state().error().is_some());
        assert_eq!(source.calls(), 1);

        sleep(Duration::from_secs(2)).await;
        assert!(poller.state().is_loading(), "tick fetch is in flight");
        assert_eq!(source.calls(), 2);

        assert!(held.send(Ok(snapshot(Indicator::None, ""))).is_ok());
        rx.wait_for(|state| state.snapshot().is_some())
            .await
            .expect("poller alive");

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_result() {
        let source = Arc::new(MockStatusSource::new());
        let held = source.hold_next();

        let mut poller = StatusPoller::new(source.clone(), DEFAULT_POLL_INTERVAL);
        poller.start();
        until_called(&source, 1).await;

        poller.stop();
        assert!(!poller.is_running());
        // The receiver may already be gone with the aborted task.
        let _ = held.send(Ok(snapshot(Indicator::Critical, "late")));

        sleep(DEFAULT_POLL_INTERVAL * 3).await;
        assert!(poller.state().is_loading());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn epoch_change_alone_drops_stale_result() {
        let source = Arc::new(MockStatusSource::new());
        let held = source.hold_next();

        let mut poller = StatusPoller::new(source.clone(), DEFAULT_POLL_INTERVAL);
        poller.start();
        until_called(&source, 1).await;

        // The task keeps running; only the epoch moves on.
        poller.state.begin_epoch();
        assert!(held.send(Ok(snapshot(Indicator::Critical, "late"))).is_ok());

        while !poller.task.as_ref().is_some_and(JoinHandle::is_finished) {
            tokio::task::yield_now().await;
        }
        assert!(poller.state().is_loading());
        assert_eq!(source.calls(), 1);

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_interval_keeps_polling() {
        let source = Arc::new(MockStatusSource::new());
        source.push_result(Err(FetchError::HttpStatus { status: 503 }));

        let huge = Duration::from_secs(u64::MAX / 2);
        let mut poller = StatusPoller::new(source.clone(), huge);
        let mut rx = poller.subscribe();
        poller.start();
        rx.wait_for(|state| state.error().is_some())
            .await
            .expect("poller alive");

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!poller.task.as_ref().is_some_and(JoinHandle::is_finished));

        sleep(MAX_POLL_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 2);
        assert!(poller.state().is_loading(), "retry is in flight");

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_never_overlap_a_pending_fetch() {
        let source = Arc::new(MockStatusSource::new());
        source.push_result(Ok(snapshot(Indicator::None, "")));
        let held = source.hold_next();

        let mut poller = StatusPoller::new(source.clone(), DEFAULT_POLL_INTERVAL);
        let mut rx = poller.subscribe();
        poller.start();
        rx.wait_for(|state| state.snapshot().is_some())
            .await
            .expect("poller alive");

        sleep(DEFAULT_POLL_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 2);

        sleep(DEFAULT_POLL_INTERVAL * 3).await;
        assert_eq!(source.calls(), 2, "a pending fetch blocks further ticks");
        assert!(poller.state().is_loading());

        assert!(held.send(Err(FetchError::HttpStatus { status: 500 })).is_ok());
        rx.wait_for(|state| state.error().is_some())
            .await
            .expect("poller alive");
        assert_eq!(source.calls(), 2);

        // next tick is a full interval after the slow fetch resolved
        sleep(DEFAULT_POLL_INTERVAL - Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 2);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls(), 3);

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_fetches_again() {
        let source = Arc::new(MockStatusSource::new());
        source.push_result(Err(FetchError::HttpStatus { status: 502 }));
        source.push_result(Ok(snapshot(Indicator::Minor, "Degraded")));

        let mut poller = StatusPoller::new(source.clone(), Duration::from_secs(60));
        let mut rx = poller.subscribe();
        poller.start();
        poller.start();
        rx.wait_for(|state| state.error().is_some())
            .await
            .expect("poller alive");
        assert_eq!(source.calls(), 1);

        poller.stop();
        poller.start();
        assert!(poller.state().is_loading());

        let state = rx
            .wait_for(|state| state.snapshot().is_some())
            .await
            .expect("poller alive")
            .clone();
        assert_eq!(
            state.snapshot().map(|s| s.headline()),
            Some("Minor Service Outage")
        );
        assert_eq!(source.calls(), 2);

        poller.stop();
    }
}
