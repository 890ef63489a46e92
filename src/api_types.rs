use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire shapes exactly as the Flask backend emits them. The three analysis
/// maps stay raw JSON maps here (`serde_json` is built with `preserve_order`,
/// so server key insertion order survives); they are validated into
/// fixed-shape records at the domain boundary.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiReview {
    pub product_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiScrapeResponse {
    pub count: usize,
    #[serde(default)]
    pub reviews: Vec<ApiReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiExample {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64, // untrusted display data, never clamped client-side
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiProcessResponse {
    pub product_id: String,
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default)]
    pub sentiments: Map<String, Value>, // label -> count, server insertion order
    #[serde(default)]
    pub aspects: Map<String, Value>, // aspect -> {Positive, Negative, Neutral}
    #[serde(default)]
    pub aspect_examples: Map<String, Value>, // aspect -> per-label example lists
    #[serde(default)]
    pub top_positive: Vec<ApiExample>,
    #[serde(default)]
    pub top_negative: Vec<ApiExample>,
}

/// Per-aspect sentiment tallies inside `aspects`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiAspectCounts {
    #[serde(rename = "Positive", default)]
    pub positive: u64,
    #[serde(rename = "Negative", default)]
    pub negative: u64,
    #[serde(rename = "Neutral", default)]
    pub neutral: u64,
}

/// Per-aspect example lists inside `aspect_examples`. Missing buckets are
/// treated as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiExampleBuckets {
    #[serde(rename = "Positive", default)]
    pub positive: Vec<ApiExample>,
    #[serde(rename = "Neutral", default)]
    pub neutral: Vec<ApiExample>,
    #[serde(rename = "Negative", default)]
    pub negative: Vec<ApiExample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSummaryResponse {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCompareResponse {
    #[serde(default)]
    pub comparison: String,
    #[serde(default)]
    pub aspect_winners: Map<String, Value>, // aspect -> {winner, scores}
    #[serde(default)]
    pub overall_scores: Map<String, Value>, // product_id -> overall sentiment score
    #[serde(default)]
    pub overall_winner: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAspectWinner {
    #[serde(default)]
    pub winner: String, // product_id or "tie"
    #[serde(default)]
    pub scores: Map<String, Value>, // product_id -> Positive minus Negative
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealthResponse {
    pub status: String,
    #[serde(default)]
    pub summarizer_loaded: bool,
}

/// Every endpoint reports failure as `{"error": message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
