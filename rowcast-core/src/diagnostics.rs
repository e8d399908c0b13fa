//! Navigation diagnostics.
//!
//! A process-wide service passed around by `Arc` rather than reached
//! through a global. It records scenario-scoped events and numeric
//! parameters into fixed-size rings, plus the latest metrics snapshot, and
//! writes a summary to the log when a scenario ends.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Events kept per scenario.
pub const MAX_EVENTS: usize = 128;
/// Parameters kept per scenario.
pub const MAX_PARAMS: usize = 128;

/// What the user was doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavScenario {
    NavRight,
    NavLeft,
    NavUp,
    NavDown,
    ItemSelected,
}

/// Checkpoints inside a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEventKind {
    ScenarioStart,
    NavStart,
    NavEnd,
    AnimStart,
    AnimComplete,
    AnimAborted,
    IndexChanged,
    CalcPos,
    CalcComplete,
}

/// One recorded checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavEvent {
    pub kind: NavEventKind,
    pub scenario: NavScenario,
    pub index: Option<usize>,
    /// Time since the scenario began.
    pub at: Duration,
}

/// A named number attached to the scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavParam {
    pub name: &'static str,
    pub value: f64,
}

/// Renderer-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub node_count: usize,
    pub texture_count: usize,
    pub pending_fetches: usize,
    pub frame_time: Duration,
}

/// What a finished scenario recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub scenario: NavScenario,
    pub duration: Duration,
    pub events: Vec<NavEvent>,
    pub params: Vec<NavParam>,
    /// Entries overwritten because a ring was full.
    pub dropped: usize,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Default)]
struct DiagState {
    scenario: Option<(NavScenario, Instant)>,
    events: VecDeque<NavEvent>,
    params: VecDeque<NavParam>,
    dropped: usize,
    metrics: MetricsSnapshot,
    last: Option<ScenarioSummary>,
}

impl DiagState {
    fn push_event(&mut self, kind: NavEventKind, index: Option<usize>) {
        let Some((scenario, started)) = self.scenario else {
            return;
        };
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(NavEvent {
            kind,
            scenario,
            index,
            at: started.elapsed(),
        });
    }

    fn push_param(&mut self, name: &'static str, value: f64) {
        if self.scenario.is_none() {
            return;
        }
        if self.params.len() == MAX_PARAMS {
            self.params.pop_front();
            self.dropped += 1;
        }
        self.params.push_back(NavParam { name, value });
    }

    fn finish(&mut self) -> Option<ScenarioSummary> {
        self.push_event(NavEventKind::CalcComplete, None);
        let (scenario, started) = self.scenario.take()?;
        let summary = ScenarioSummary {
            scenario,
            duration: started.elapsed(),
            events: self.events.drain(..).collect(),
            params: self.params.drain(..).collect(),
            dropped: std::mem::take(&mut self.dropped),
            metrics: self.metrics,
        };
        self.last = Some(summary.clone());
        Some(summary)
    }
}

/// Scenario-scoped navigation recorder.
#[derive(Debug)]
pub struct NavDiagnostics {
    initialized: AtomicBool,
    state: Mutex<DiagState>,
}

impl Default for NavDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl NavDiagnostics {
    /// Create an uninitialized recorder. Nothing is recorded until
    /// [`NavDiagnostics::init`].
    pub fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            state: Mutex::new(DiagState::default()),
        }
    }

    pub fn init(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Flush any open scenario and stop recording.
    pub fn shutdown(&self) {
        if !self.initialized.swap(false, Ordering::AcqRel) {
            return;
        }
        let summary = self.state.lock().finish();
        if let Some(summary) = summary {
            log_summary(&summary);
        }
    }

    /// Recording is on only between `init` and `shutdown`.
    pub fn is_active(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Start a scenario, closing any open one first.
    pub fn begin_scenario(&self, scenario: NavScenario) {
        if !self.is_active() {
            return;
        }
        let previous = {
            let mut state = self.state.lock();
            let previous = state.finish();
            state.scenario = Some((scenario, Instant::now()));
            state.push_event(NavEventKind::ScenarioStart, None);
            previous
        };
        if let Some(previous) = previous {
            log_summary(&previous);
        }
    }

    /// Close the open scenario and log its summary.
    pub fn end_scenario(&self) -> Option<ScenarioSummary> {
        if !self.is_active() {
            return None;
        }
        let summary = self.state.lock().finish()?;
        log_summary(&summary);
        Some(summary)
    }

    pub fn is_scenario_active(&self) -> bool {
        self.state.lock().scenario.is_some()
    }

    pub fn log_event(&self, kind: NavEventKind, index: Option<usize>) {
        if self.is_active() {
            self.state.lock().push_event(kind, index);
        }
    }

    pub fn log_param(
        &self,
        kind: NavEventKind,
        index: Option<usize>,
        name: &'static str,
        value: f64,
    ) {
        if self.is_active() {
            let mut state = self.state.lock();
            state.push_event(kind, index);
            state.push_param(name, value);
        }
    }

    /// Record a computed position.
    pub fn log_position(&self, index: Option<usize>, x: f32, y: f32) {
        if self.is_active() {
            let mut state = self.state.lock();
            state.push_event(NavEventKind::CalcPos, index);
            state.push_param("x", f64::from(x));
            state.push_param("y", f64::from(y));
        }
    }

    pub fn record_metrics(&self, metrics: MetricsSnapshot) {
        self.state.lock().metrics = metrics;
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.state.lock().metrics
    }

    /// Summary of the most recently closed scenario.
    pub fn last_summary(&self) -> Option<ScenarioSummary> {
        self.state.lock().last.clone()
    }
}

fn log_summary(summary: &ScenarioSummary) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let mut line = String::new();
    for event in &summary.events {
        let _ = write!(line, " {:?}@{}ms", event.kind, event.at.as_millis());
        if let Some(index) = event.index {
            let _ = write!(line, "#{index}");
        }
    }
    log::debug!(
        "Nav {:?} took {:?}: {} events, {} params, {} dropped, nodes={} textures={}{}",
        summary.scenario,
        summary.duration,
        summary.events.len(),
        summary.params.len(),
        summary.dropped,
        summary.metrics.node_count,
        summary.metrics.texture_count,
        line
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_records_before_init() {
        let diag = NavDiagnostics::new();
        diag.begin_scenario(NavScenario::NavRight);

        assert!(!diag.is_scenario_active());
        assert!(diag.end_scenario().is_none());
    }

    #[test]
    fn scenario_collects_events_and_params_in_order() {
        let diag = NavDiagnostics::new();
        diag.init();
        diag.begin_scenario(NavScenario::NavDown);
        diag.log_event(NavEventKind::NavStart, Some(3));
        diag.log_param(NavEventKind::IndexChanged, Some(7), "target", 7.0);

        let summary = diag.end_scenario().expect("scenario open");

        let kinds: Vec<NavEventKind> = summary.events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NavEventKind::ScenarioStart,
                NavEventKind::NavStart,
                NavEventKind::IndexChanged,
                NavEventKind::CalcComplete,
            ]
        );
        assert_eq!(summary.params, vec![NavParam { name: "target", value: 7.0 }]);
        assert!(!diag.is_scenario_active());
    }

    #[test]
    fn full_ring_overwrites_oldest() {
        let diag = NavDiagnostics::new();
        diag.init();
        diag.begin_scenario(NavScenario::NavRight);
        for i in 0..MAX_EVENTS + 10 {
            diag.log_event(NavEventKind::CalcPos, Some(i));
        }

        let summary = diag.end_scenario().expect("scenario open");

        assert_eq!(summary.events.len(), MAX_EVENTS);
        // The start event and the first eleven positions were pushed out.
        assert_eq!(summary.dropped, 12);
        assert_eq!(summary.events.last().map(|e| e.kind), Some(NavEventKind::CalcComplete));
    }

    #[test]
    fn beginning_a_scenario_closes_the_previous_one() {
        let diag = NavDiagnostics::new();
        diag.init();
        diag.begin_scenario(NavScenario::NavLeft);
        diag.begin_scenario(NavScenario::NavUp);

        let previous = diag.last_summary().expect("left scenario closed");
        assert_eq!(previous.scenario, NavScenario::NavLeft);
        assert!(diag.is_scenario_active());

        diag.shutdown();
        assert!(!diag.is_scenario_active());
        assert!(!diag.is_active());
    }
}
