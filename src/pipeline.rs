use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::client::ReviewApi;
use crate::error::{AnalysisError, Side};
use crate::models::Platform;

/// Controller state set. Legal transitions: `Idle → Loading`,
/// `Loading → {Idle, Ready, Failed}`, and `Ready/Failed → Loading` on a new
/// run. `Loading → Idle` is the empty-result path (re-runnable, not failed).
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Phase<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Ready(_) => "ready",
            Phase::Failed(_) => "failed",
        }
    }

    fn can_enter(&self, next: &Phase<T>) -> bool {
        match self {
            Phase::Loading => true,
            Phase::Idle | Phase::Ready(_) | Phase::Failed(_) => {
                matches!(next, Phase::Loading)
            }
        }
    }
}

/// Run-sequenced state cell shared by both controllers. Every run bumps the
/// sequence number; a run may only settle the phase while it is still the
/// newest one, so a slow superseded run can never overwrite fresher state.
#[derive(Debug)]
pub(crate) struct ControllerState<T> {
    phase: Phase<T>,
    seq: u64,
}

impl<T: Clone> ControllerState<T> {
    pub(crate) fn new() -> Self {
        ControllerState {
            phase: Phase::Idle,
            seq: 0,
        }
    }

    pub(crate) fn phase(&self) -> Phase<T> {
        self.phase.clone()
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    /// Enter Loading, clearing any prior outcome, and tag the new run.
    pub(crate) fn begin_run(&mut self) -> u64 {
        self.transition(Phase::Loading);
        self.seq += 1;
        self.seq
    }

    /// Settle the phase on behalf of run `run`. Returns false (and leaves
    /// the phase untouched) when a newer run has started since.
    pub(crate) fn settle(&mut self, run: u64, next: Phase<T>) -> bool {
        if run != self.seq {
            debug!(
                "Discarding stale result - run={}, current={}, would_be_state={}",
                run,
                self.seq,
                next.name()
            );
            return false;
        }
        self.transition(next);
        true
    }

    fn transition(&mut self, next: Phase<T>) {
        if !self.phase.can_enter(&next) {
            warn!(
                "Unexpected state transition - from={}, to={}",
                self.phase.name(),
                next.name()
            );
        }
        debug!("State transition - from={}, to={}", self.phase.name(), next.name());
        self.phase = next;
    }
}

/// Final state of a successful single-product run. The chart/example payload
/// is not carried here; the presentation path re-queries the process
/// endpoint, which is idempotent.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub product_id: String,
    pub summary: String,
}

/// Drives one product through scrape → process → summarize against a fixed
/// platform. Strictly sequential: summarize is never issued before process
/// acknowledges success.
pub struct PipelineController<A> {
    api: A,
    platform: Platform,
    state: Mutex<ControllerState<PipelineOutcome>>,
}

impl<A: ReviewApi> PipelineController<A> {
    pub fn new(api: A, platform: Platform) -> Self {
        PipelineController {
            api,
            platform,
            state: Mutex::new(ControllerState::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn phase(&self) -> Phase<PipelineOutcome> {
        self.state.lock().unwrap().phase()
    }

    pub async fn run(&self, url: &str) -> Result<(), AnalysisError> {
        if url.trim().is_empty() {
            return Err(AnalysisError::InvalidUrl);
        }

        let run = self.state.lock().unwrap().begin_run();
        match self.execute(run, url).await {
            Ok(Some(outcome)) => {
                self.state.lock().unwrap().settle(run, Phase::Ready(outcome));
                Ok(())
            }
            // superseded mid-flight; a newer run owns the state now
            Ok(None) => Ok(()),
            Err(e @ AnalysisError::NoReviews(_)) => {
                self.state.lock().unwrap().settle(run, Phase::Idle);
                Err(e)
            }
            Err(e) => {
                self.state
                    .lock()
                    .unwrap()
                    .settle(run, Phase::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn is_current(&self, run: u64) -> bool {
        self.state.lock().unwrap().seq() == run
    }

    /// Ok(None) means the run was superseded and its results discarded.
    async fn execute(
        &self,
        run: u64,
        url: &str,
    ) -> Result<Option<PipelineOutcome>, AnalysisError> {
        let start = Instant::now();
        info!(
            "Analysis pipeline started - run={}, platform={}, url={}",
            run, self.platform, url
        );

        let scraped = self.api.scrape(self.platform, url).await?;
        if !self.is_current(run) {
            return Ok(None);
        }
        let product_id = match scraped.product_id() {
            Some(pid) => pid.to_string(),
            None => return Err(AnalysisError::NoReviews(Side::Single)),
        };
        debug!(
            "Scrape completed - run={}, product_id={}, reviews={}",
            run, product_id, scraped.count
        );

        let payload = self.api.process(&product_id).await?;
        if !self.is_current(run) {
            return Ok(None);
        }
        debug!(
            "NLP processing completed - run={}, product_id={}, reviews={}, aspects={}",
            run,
            product_id,
            payload.total_reviews,
            payload.aspects.len()
        );

        let summary = self.api.summarize(&product_id).await?;
        if !self.is_current(run) {
            return Ok(None);
        }

        info!(
            "Analysis pipeline completed - run={}, product_id={}, duration={:.2}s",
            run,
            product_id,
            start.elapsed().as_secs_f32()
        );
        Ok(Some(PipelineOutcome {
            product_id,
            summary,
        }))
    }
}
