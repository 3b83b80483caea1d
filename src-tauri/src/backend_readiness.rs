use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    task::JoinSet,
    time::{interval_at, sleep_until, Instant, MissedTickBehavior},
};

use crate::{DEFAULT_READY_POLL_INTERVAL_MS, DEFAULT_READY_PROBE_TIMEOUT_MS, DEFAULT_READY_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReadinessSettings {
    pub(crate) timeout: Duration,
    pub(crate) interval: Duration,
    pub(crate) probe_timeout: Duration,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_READY_TIMEOUT,
            interval: Duration::from_millis(DEFAULT_READY_POLL_INTERVAL_MS),
            probe_timeout: Duration::from_millis(DEFAULT_READY_PROBE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProbeResult {
    Healthy,
    NotReady(u16),
    Unreachable(String),
}

impl ProbeResult {
    fn describe(&self) -> String {
        match self {
            ProbeResult::Healthy => "200".to_string(),
            ProbeResult::NotReady(status) => status.to_string(),
            ProbeResult::Unreachable(error) => error.clone(),
        }
    }
}

pub(crate) trait HealthProbe: Send + Sync + 'static {
    fn probe(&self, url: &str) -> impl Future<Output = ProbeResult> + Send;
}

/// `GET` probe; only an exact 200 counts as healthy and redirects are not followed.
#[derive(Debug, Clone)]
pub(crate) struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub(crate) fn new(probe_timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|error| format!("Failed to build readiness HTTP client: {error}"))?;
        Ok(Self { client })
    }
}

impl HealthProbe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeResult {
        match self.client.get(url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => ProbeResult::Healthy,
            Ok(response) => ProbeResult::NotReady(response.status().as_u16()),
            Err(error) => ProbeResult::Unreachable(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadinessState {
    Polling,
    Ready,
    TimedOut,
}

/// One polling session. Entering either terminal state closes the other.
#[derive(Debug)]
pub(crate) struct ReadinessCheck {
    state: ReadinessState,
    started_at: Instant,
}

impl ReadinessCheck {
    pub(crate) fn new(started_at: Instant) -> Self {
        Self {
            state: ReadinessState::Polling,
            started_at,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ReadinessState {
        self.state
    }

    pub(crate) fn started_at(&self) -> Instant {
        self.started_at
    }

    pub(crate) fn mark_ready(&mut self) -> bool {
        self.finish(ReadinessState::Ready)
    }

    pub(crate) fn mark_timed_out(&mut self) -> bool {
        self.finish(ReadinessState::TimedOut)
    }

    fn finish(&mut self, terminal: ReadinessState) -> bool {
        if self.state != ReadinessState::Polling {
            return false;
        }
        self.state = terminal;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReadinessTimeout {
    pub(crate) url: String,
    pub(crate) timeout: Duration,
}

impl ReadinessTimeout {
    pub(crate) fn message(&self) -> String {
        format!(
            "Backend did not become ready within {}s at {}.",
            self.timeout.as_secs_f64(),
            self.url
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReadinessOutcome {
    Ready,
    TimedOut(ReadinessTimeout),
}

/// Probes `target_url` once per interval until it answers 200 or the timeout
/// elapses, then runs exactly one of `on_ready` / `on_timeout`.
///
/// A new probe is issued on every tick even while earlier ones are pending.
/// Pending probes are aborted when the session ends, and a success that lands
/// after the deadline is never observed.
pub(crate) async fn poll_until_ready<P, R, T, L>(
    probe: Arc<P>,
    target_url: &str,
    settings: ReadinessSettings,
    on_ready: R,
    on_timeout: T,
    log: L,
) -> ReadinessOutcome
where
    P: HealthProbe,
    R: FnOnce(),
    T: FnOnce(&ReadinessTimeout),
    L: Fn(&str),
{
    let mut check = ReadinessCheck::new(Instant::now());
    let deadline = sleep_until(check.started_at() + settings.timeout);
    tokio::pin!(deadline);
    let mut ticker = interval_at(check.started_at() + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: JoinSet<ProbeResult> = JoinSet::new();

    log(&format!(
        "waiting for backend at {} (timeout {}ms, interval {}ms)",
        target_url,
        settings.timeout.as_millis(),
        settings.interval.as_millis()
    ));

    let outcome = loop {
        tokio::select! {
            biased;

            Some(joined) = in_flight.join_next() => {
                let result = joined.unwrap_or_else(|error| {
                    ProbeResult::Unreachable(format!("probe task failed: {error}"))
                });
                if result == ProbeResult::Healthy {
                    if check.mark_ready() {
                        break ReadinessOutcome::Ready;
                    }
                } else {
                    log(&format!("readiness probe {target_url} -> {}", result.describe()));
                }
            }
            () = &mut deadline => {
                if check.mark_timed_out() {
                    break ReadinessOutcome::TimedOut(ReadinessTimeout {
                        url: target_url.to_string(),
                        timeout: settings.timeout,
                    });
                }
            }
            _ = ticker.tick() => {
                let probe = Arc::clone(&probe);
                let url = target_url.to_string();
                in_flight.spawn(async move { probe.probe(&url).await });
            }
        }
    };

    in_flight.abort_all();

    match &outcome {
        ReadinessOutcome::Ready => {
            log(&format!(
                "backend ready at {} after {}ms",
                target_url,
                check.started_at().elapsed().as_millis()
            ));
            on_ready();
        }
        ReadinessOutcome::TimedOut(timeout) => {
            log(&format!("backend readiness timed out: {}", timeout.message()));
            on_timeout(timeout);
        }
    }

    outcome
}
