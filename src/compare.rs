use std::sync::Mutex;
use std::time::Instant;

use futures::future::try_join;
use tracing::{debug, info};

use crate::client::ReviewApi;
use crate::error::{AnalysisError, Side};
use crate::models::{AnalysisResult, ComparisonResult, Platform};
use crate::pipeline::{ControllerState, Phase};
use crate::store;

/// Display titles sent to the compare endpoint.
const TITLE_1: &str = "Product 1";
const TITLE_2: &str = "Product 2";

/// One side of a finished comparison. The displayed sentiment is derived
/// from the product's actual sentiment distribution (majority label), not a
/// fixed placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductReport {
    pub analysis: AnalysisResult,
    pub sentiment_label: String,
}

impl ProductReport {
    fn new(analysis: AnalysisResult) -> Self {
        let sentiment_label = store::majority_label(&analysis.sentiments)
            .unwrap_or("Unrated")
            .to_string();
        ProductReport {
            analysis,
            sentiment_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOutcome {
    pub product1: ProductReport,
    pub product2: ProductReport,
    pub comparison: ComparisonResult,
}

/// Runs the two per-product chains concurrently (they may interleave
/// freely), joins them, then requests the comparison narrative. Both chains
/// must succeed before compare is issued; the first failure drops the other
/// chain and aborts the run.
pub struct ComparisonController<A> {
    api: A,
    state: Mutex<ControllerState<ComparisonOutcome>>,
}

impl<A: ReviewApi> ComparisonController<A> {
    pub fn new(api: A) -> Self {
        ComparisonController {
            api,
            state: Mutex::new(ControllerState::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn phase(&self) -> Phase<ComparisonOutcome> {
        self.state.lock().unwrap().phase()
    }

    pub async fn compare(&self, url1: &str, url2: &str) -> Result<(), AnalysisError> {
        if url1.trim().is_empty() || url2.trim().is_empty() {
            return Err(AnalysisError::InvalidUrl);
        }
        let platform1 =
            Platform::classify(url1).ok_or(AnalysisError::UnknownPlatform(Side::First))?;
        let platform2 =
            Platform::classify(url2).ok_or(AnalysisError::UnknownPlatform(Side::Second))?;

        let run = self.state.lock().unwrap().begin_run();
        match self.execute(run, (platform1, url1), (platform2, url2)).await {
            Ok(Some(outcome)) => {
                self.state.lock().unwrap().settle(run, Phase::Ready(outcome));
                Ok(())
            }
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

    async fn execute(
        &self,
        run: u64,
        (platform1, url1): (Platform, &str),
        (platform2, url2): (Platform, &str),
    ) -> Result<Option<ComparisonOutcome>, AnalysisError> {
        let start = Instant::now();
        info!(
            "Comparison started - run={}, platforms={}/{}",
            run, platform1, platform2
        );

        // join barrier: compare is issued only once both chains are done
        let (analysis1, analysis2) = try_join(
            self.product_chain(platform1, url1, Side::First),
            self.product_chain(platform2, url2, Side::Second),
        )
        .await?;
        if !self.is_current(run) {
            return Ok(None);
        }

        let comparison = self
            .api
            .compare(
                &analysis1.product_id,
                &analysis2.product_id,
                TITLE_1,
                TITLE_2,
            )
            .await?;
        if !self.is_current(run) {
            return Ok(None);
        }

        info!(
            "Comparison completed - run={}, products={}/{}, duration={:.2}s",
            run,
            analysis1.product_id,
            analysis2.product_id,
            start.elapsed().as_secs_f32()
        );
        Ok(Some(ComparisonOutcome {
            product1: ProductReport::new(analysis1),
            product2: ProductReport::new(analysis2),
            comparison,
        }))
    }

    /// One product's scrape → process → summarize chain. Unlike the single
    /// pipeline, the process payload is captured here so both panels can be
    /// displayed without re-querying after the join.
    async fn product_chain(
        &self,
        platform: Platform,
        url: &str,
        side: Side,
    ) -> Result<AnalysisResult, AnalysisError> {
        let scraped = self.api.scrape(platform, url).await?;
        let product_id = match scraped.product_id() {
            Some(pid) => pid.to_string(),
            None => return Err(AnalysisError::NoReviews(side)),
        };
        debug!(
            "Scrape completed - side={}, product_id={}, reviews={}",
            side, product_id, scraped.count
        );

        let payload = self.api.process(&product_id).await?;
        let summary = self.api.summarize(&product_id).await?;
        Ok(AnalysisResult::from_parts(payload, summary))
    }
}
