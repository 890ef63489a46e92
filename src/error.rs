use std::fmt;

use thiserror::Error;

/// Which product a failure refers to. Comparison runs report the failing
/// side to the user; single-product runs use `Single`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Single,
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Single => write!(f, "this product"),
            Side::First => write!(f, "product 1"),
            Side::Second => write!(f, "product 2"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// Local input rejection; no network call was issued.
    #[error("please enter a product URL")]
    InvalidUrl,

    /// URL matched none of the known platform tokens; no network call was issued.
    #[error("{0} is not an eBay or BestBuy URL")]
    UnknownPlatform(Side),

    /// The scrape succeeded but returned zero reviews. Re-runnable.
    #[error("no reviews found for {0}")]
    NoReviews(Side),

    /// Transport failure, timeout, or an error-carrying payload at any step.
    /// The run is aborted and must be restarted from scratch.
    #[error("{step} step failed: {message}")]
    Pipeline { step: &'static str, message: String },
}

impl AnalysisError {
    pub fn pipeline(step: &'static str, message: impl fmt::Display) -> Self {
        AnalysisError::Pipeline {
            step,
            message: message.to_string(),
        }
    }
}
