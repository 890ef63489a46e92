use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api_types::{
    ApiAspectCounts, ApiAspectWinner, ApiCompareResponse, ApiExample, ApiExampleBuckets,
    ApiProcessResponse, ApiScrapeResponse,
};

/// The fixed sentiment label set, in the order the backend tallies them.
pub const SENTIMENT_LABELS: [&str; 3] = ["Positive", "Neutral", "Negative"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ebay,
    BestBuy,
}

impl Platform {
    /// Case-sensitive substring match against the platform domain tokens,
    /// eBay checked first.
    pub fn classify(url: &str) -> Option<Platform> {
        if url.contains("ebay") {
            Some(Platform::Ebay)
        } else if url.contains("bestbuy") {
            Some(Platform::BestBuy)
        } else {
            None
        }
    }

    pub fn scrape_endpoint(&self) -> &'static str {
        match self {
            Platform::Ebay => "scrape_ebay",
            Platform::BestBuy => "scrape_bestbuy",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ebay => write!(f, "ebay"),
            Platform::BestBuy => write!(f, "bestbuy"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub product_id: String,
    pub source: String,
    pub reviewer: String,
    pub text: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub count: usize,
    pub reviews: Vec<Review>,
}

impl ScrapeResult {
    pub fn from_api(api: ApiScrapeResponse) -> Self {
        let reviews = api
            .reviews
            .into_iter()
            .map(|r| Review {
                product_id: r.product_id,
                source: r.source,
                reviewer: r.reviewer,
                text: r.text,
                date: r.date,
            })
            .collect();
        ScrapeResult {
            count: api.count,
            reviews,
        }
    }

    /// The product id is defined only by a non-empty result's first review.
    pub fn product_id(&self) -> Option<&str> {
        self.reviews.first().map(|r| r.product_id.as_str())
    }
}

/// (label, count) pairs preserving server insertion order.
pub type SentimentCounts = Vec<(String, u64)>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectSentiments {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewExample {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleBuckets {
    pub positive: Vec<ReviewExample>,
    pub neutral: Vec<ReviewExample>,
    pub negative: Vec<ReviewExample>,
}

impl ExampleBuckets {
    pub fn bucket(&self, label: &str) -> &[ReviewExample] {
        match label {
            "Positive" => &self.positive,
            "Neutral" => &self.neutral,
            _ => &self.negative,
        }
    }
}

/// Everything the process endpoint derives for one product. Key order of
/// `sentiments`, `aspects` and `aspect_examples` is the server's.
#[derive(Debug, Clone)]
pub struct ProcessPayload {
    pub product_id: String,
    pub total_reviews: u64,
    pub sentiments: SentimentCounts,
    pub aspects: Vec<(String, AspectSentiments)>,
    pub aspect_examples: Vec<(String, ExampleBuckets)>,
    pub top_positive: Vec<ReviewExample>,
    pub top_negative: Vec<ReviewExample>,
}

impl ProcessPayload {
    /// Boundary validation: the loose server maps become fixed-shape records.
    /// Unknown sentiment labels and malformed aspect entries are dropped with
    /// a warning; everything kept retains server order.
    pub fn from_api(api: ApiProcessResponse) -> Self {
        let mut sentiments = Vec::with_capacity(api.sentiments.len());
        for (label, value) in api.sentiments {
            let count = value.as_u64();
            match count {
                Some(count) if SENTIMENT_LABELS.contains(&label.as_str()) => {
                    sentiments.push((label, count));
                }
                _ => warn!(
                    "Dropping unexpected sentiment entry - product_id={}, label={}",
                    api.product_id, label
                ),
            }
        }

        let mut aspects = Vec::with_capacity(api.aspects.len());
        for (aspect, value) in api.aspects {
            match serde_json::from_value::<ApiAspectCounts>(value) {
                Ok(counts) => aspects.push((
                    aspect,
                    AspectSentiments {
                        positive: counts.positive,
                        negative: counts.negative,
                        neutral: counts.neutral,
                    },
                )),
                Err(e) => warn!(
                    "Dropping malformed aspect entry - product_id={}, aspect={}, error={}",
                    api.product_id, aspect, e
                ),
            }
        }

        let mut aspect_examples = Vec::with_capacity(api.aspect_examples.len());
        for (aspect, value) in api.aspect_examples {
            match serde_json::from_value::<ApiExampleBuckets>(value) {
                Ok(buckets) => aspect_examples.push((
                    aspect,
                    ExampleBuckets {
                        positive: examples_from_api(buckets.positive),
                        neutral: examples_from_api(buckets.neutral),
                        negative: examples_from_api(buckets.negative),
                    },
                )),
                Err(e) => warn!(
                    "Dropping malformed aspect examples - product_id={}, aspect={}, error={}",
                    api.product_id, aspect, e
                ),
            }
        }

        ProcessPayload {
            product_id: api.product_id,
            total_reviews: api.total_reviews,
            sentiments,
            aspects,
            aspect_examples,
            top_positive: examples_from_api(api.top_positive),
            top_negative: examples_from_api(api.top_negative),
        }
    }
}

fn examples_from_api(examples: Vec<ApiExample>) -> Vec<ReviewExample> {
    examples
        .into_iter()
        .map(|e| ReviewExample {
            text: e.text,
            confidence: e.confidence,
        })
        .collect()
}

/// One product's complete analysis. Immutable once assembled; a re-fetch for
/// the same product fully replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub product_id: String,
    pub total_reviews: u64,
    pub sentiments: SentimentCounts,
    pub aspects: Vec<(String, AspectSentiments)>,
    pub aspect_examples: Vec<(String, ExampleBuckets)>,
    pub top_positive: Vec<ReviewExample>,
    pub top_negative: Vec<ReviewExample>,
    pub summary: String,
}

impl AnalysisResult {
    pub fn from_parts(payload: ProcessPayload, summary: String) -> Self {
        AnalysisResult {
            product_id: payload.product_id,
            total_reviews: payload.total_reviews,
            sentiments: payload.sentiments,
            aspects: payload.aspects,
            aspect_examples: payload.aspect_examples,
            top_positive: payload.top_positive,
            top_negative: payload.top_negative,
            summary,
        }
    }

    pub fn aspect_counts(&self, aspect: &str) -> Option<&AspectSentiments> {
        self.aspects
            .iter()
            .find(|(name, _)| name == aspect)
            .map(|(_, counts)| counts)
    }

    pub fn examples_for(&self, aspect: &str) -> Option<&ExampleBuckets> {
        self.aspect_examples
            .iter()
            .find(|(name, _)| name == aspect)
            .map(|(_, buckets)| buckets)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectWinner {
    pub winner: String, // product_id or "tie"
    pub scores: Vec<(String, i64)>,
}

/// Output of the compare endpoint: the narrative plus the structured
/// winner/score breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub comparison_text: String,
    pub aspect_winners: Vec<(String, AspectWinner)>,
    pub overall_scores: Vec<(String, f64)>,
    pub overall_winner: String,
    pub product_ids: Vec<String>,
}

impl ComparisonResult {
    pub fn from_api(api: ApiCompareResponse) -> Self {
        let mut aspect_winners = Vec::with_capacity(api.aspect_winners.len());
        for (aspect, value) in api.aspect_winners {
            match serde_json::from_value::<ApiAspectWinner>(value) {
                Ok(w) => {
                    let scores = w
                        .scores
                        .into_iter()
                        .filter_map(|(pid, v)| v.as_i64().map(|s| (pid, s)))
                        .collect();
                    aspect_winners.push((
                        aspect,
                        AspectWinner {
                            winner: w.winner,
                            scores,
                        },
                    ));
                }
                Err(e) => warn!(
                    "Dropping malformed aspect winner - aspect={}, error={}",
                    aspect, e
                ),
            }
        }

        let overall_scores = api
            .overall_scores
            .into_iter()
            .filter_map(|(pid, v)| v.as_f64().map(|s| (pid, s)))
            .collect();

        ComparisonResult {
            comparison_text: api.comparison,
            aspect_winners,
            overall_scores,
            overall_winner: api.overall_winner,
            product_ids: api.product_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn classify_matches_platform_tokens() {
        assert_eq!(
            Platform::classify("https://www.ebay.com/itm/123"),
            Some(Platform::Ebay)
        );
        assert_eq!(
            Platform::classify("https://www.bestbuy.com/site/456"),
            Some(Platform::BestBuy)
        );
        assert_eq!(Platform::classify("https://www.amazon.com/dp/789"), None);
    }

    #[test]
    fn classify_is_case_sensitive() {
        assert_eq!(Platform::classify("https://www.EBAY.com/itm/123"), None);
    }

    #[test]
    fn process_payload_keeps_server_sentiment_order() {
        let api: ApiProcessResponse = serde_json::from_value(json!({
            "product_id": "P1",
            "total_reviews": 8,
            "sentiments": {"Positive": 5, "Neutral": 2, "Negative": 1}
        }))
        .unwrap();
        let payload = ProcessPayload::from_api(api);
        assert_eq!(
            payload.sentiments,
            vec![
                ("Positive".to_string(), 5),
                ("Neutral".to_string(), 2),
                ("Negative".to_string(), 1)
            ]
        );
    }

    #[test]
    fn process_payload_drops_unknown_sentiment_labels() {
        let api: ApiProcessResponse = serde_json::from_value(json!({
            "product_id": "P1",
            "sentiments": {"Positive": 5, "Mixed": 9, "Negative": 1}
        }))
        .unwrap();
        let payload = ProcessPayload::from_api(api);
        assert_eq!(
            payload.sentiments,
            vec![("Positive".to_string(), 5), ("Negative".to_string(), 1)]
        );
    }

    #[test]
    fn process_payload_defaults_missing_example_buckets() {
        let api: ApiProcessResponse = serde_json::from_value(json!({
            "product_id": "P1",
            "aspects": {"battery": {"Positive": 3, "Negative": 1, "Neutral": 0}},
            "aspect_examples": {
                "battery": {"Positive": [{"text": "lasts all day", "confidence": 0.91}]}
            }
        }))
        .unwrap();
        let payload = ProcessPayload::from_api(api);
        assert_eq!(payload.aspects[0].1.positive, 3);
        let (_, buckets) = &payload.aspect_examples[0];
        assert_eq!(buckets.positive.len(), 1);
        assert!(buckets.neutral.is_empty());
        assert!(buckets.negative.is_empty());
    }

    #[test]
    fn scrape_result_product_id_requires_reviews() {
        let empty = ScrapeResult {
            count: 0,
            reviews: vec![],
        };
        assert_eq!(empty.product_id(), None);
    }

    #[test]
    fn comparison_result_parses_winners() {
        let api: ApiCompareResponse = serde_json::from_value(json!({
            "comparison": "A beats B",
            "aspect_winners": {
                "battery": {"winner": "P1", "scores": {"P1": 4, "P2": -1}}
            },
            "overall_scores": {"P1": 0.62, "P2": 0.31},
            "overall_winner": "P1",
            "product_ids": ["P1", "P2"]
        }))
        .unwrap();
        let comp = ComparisonResult::from_api(api);
        assert_eq!(comp.comparison_text, "A beats B");
        assert_eq!(comp.aspect_winners[0].1.winner, "P1");
        assert_eq!(comp.overall_winner, "P1");
    }
}
