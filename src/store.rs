use crate::models::{AnalysisResult, ExampleBuckets};

/// Preview cutoff for example texts, in characters.
pub const PREVIEW_LIMIT: usize = 160;

/// One bar-chart row: per-aspect tallies in the series order the chart
/// expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectRow {
    pub aspect: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

/// Pure derivation of chart series and browsing defaults from one analysis
/// snapshot. Re-deriving from the same snapshot yields identical output; no
/// I/O happens here.
#[derive(Debug, Clone)]
pub struct AnalysisDataStore {
    result: AnalysisResult,
    default_aspect: Option<String>, // memoized, recomputed only on product change
}

impl AnalysisDataStore {
    pub fn new(result: AnalysisResult) -> Self {
        let default_aspect = compute_default_aspect(&result);
        AnalysisDataStore {
            result,
            default_aspect,
        }
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn product_id(&self) -> &str {
        &self.result.product_id
    }

    /// Replace the snapshot. Returns true when the product changed, which
    /// also refreshes the memoized default aspect; a re-fetch of the same
    /// product keeps it stable.
    pub fn replace(&mut self, result: AnalysisResult) -> bool {
        let changed = result.product_id != self.result.product_id;
        if changed {
            self.default_aspect = compute_default_aspect(&result);
        }
        self.result = result;
        changed
    }

    /// (label, count) pairs in server key insertion order, not sorted.
    pub fn sentiment_series(&self) -> Vec<(String, u64)> {
        self.result.sentiments.clone()
    }

    /// One row per aspect, in server key iteration order.
    pub fn aspect_series(&self) -> Vec<AspectRow> {
        self.result
            .aspects
            .iter()
            .map(|(aspect, counts)| AspectRow {
                aspect: aspect.clone(),
                positive: counts.positive,
                negative: counts.negative,
                neutral: counts.neutral,
            })
            .collect()
    }

    /// Lexicographically smallest aspect name, held stable for the lifetime
    /// of the displayed product.
    pub fn default_selected_aspect(&self) -> Option<&str> {
        self.default_aspect.as_deref()
    }

    /// Examples for one aspect; an aspect absent from the payload renders as
    /// empty buckets rather than an error.
    pub fn buckets_for(&self, aspect: &str) -> ExampleBuckets {
        self.result
            .examples_for(aspect)
            .cloned()
            .unwrap_or_default()
    }
}

fn compute_default_aspect(result: &AnalysisResult) -> Option<String> {
    result
        .aspects
        .iter()
        .map(|(aspect, _)| aspect)
        .min()
        .cloned()
}

/// Display form of an example text: the text to show and whether an
/// expand/collapse control applies. Texts at or under the preview limit are
/// never truncated and carry no control.
pub fn display_text(text: &str, expanded: bool) -> (String, bool) {
    if text.chars().count() <= PREVIEW_LIMIT {
        return (text.to_string(), false);
    }
    if expanded {
        (text.to_string(), true)
    } else {
        let preview: String = text.chars().take(PREVIEW_LIMIT).collect();
        (format!("{preview}…"), true)
    }
}

/// Confidence as a percentage with one decimal, e.g. `92.3%`. The raw value
/// is untrusted display data and is not clamped.
pub fn confidence_pct(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Majority sentiment label of a series; ties resolve to the earlier label
/// in server order. None for an empty series.
pub fn majority_label(series: &[(String, u64)]) -> Option<&str> {
    let mut best: Option<(&str, u64)> = None;
    for (label, count) in series {
        match best {
            Some((_, top)) if *count <= top => {}
            _ => best = Some((label, *count)),
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectSentiments;
    use pretty_assertions::assert_eq;

    fn result(product_id: &str, aspects: &[&str]) -> AnalysisResult {
        AnalysisResult {
            product_id: product_id.to_string(),
            total_reviews: 8,
            sentiments: vec![
                ("Positive".to_string(), 5),
                ("Neutral".to_string(), 2),
                ("Negative".to_string(), 1),
            ],
            aspects: aspects
                .iter()
                .map(|a| {
                    (
                        a.to_string(),
                        AspectSentiments {
                            positive: 3,
                            negative: 1,
                            neutral: 0,
                        },
                    )
                })
                .collect(),
            aspect_examples: vec![],
            top_positive: vec![],
            top_negative: vec![],
            summary: "Great".to_string(),
        }
    }

    #[test]
    fn sentiment_series_preserves_server_order() {
        let store = AnalysisDataStore::new(result("P1", &["battery"]));
        assert_eq!(
            store.sentiment_series(),
            vec![
                ("Positive".to_string(), 5),
                ("Neutral".to_string(), 2),
                ("Negative".to_string(), 1)
            ]
        );
        // idempotent: same snapshot, same output
        assert_eq!(store.sentiment_series(), store.sentiment_series());
    }

    #[test]
    fn aspect_series_keeps_key_iteration_order() {
        let store = AnalysisDataStore::new(result("P1", &["price", "battery"]));
        let rows = store.aspect_series();
        assert_eq!(rows[0].aspect, "price");
        assert_eq!(rows[1].aspect, "battery");
        assert_eq!(rows[0].positive, 3);
    }

    #[test]
    fn default_aspect_is_lexicographic_minimum() {
        let store = AnalysisDataStore::new(result("P1", &["price", "battery"]));
        assert_eq!(store.default_selected_aspect(), Some("battery"));
    }

    #[test]
    fn default_aspect_stable_for_same_product() {
        let mut store = AnalysisDataStore::new(result("P1", &["battery", "price"]));
        assert_eq!(store.default_selected_aspect(), Some("battery"));

        // a re-fetch of the same product replaces data but not the default
        let changed = store.replace(result("P1", &["screen", "price"]));
        assert!(!changed);
        assert_eq!(store.default_selected_aspect(), Some("battery"));
    }

    #[test]
    fn default_aspect_recomputed_on_product_change() {
        let mut store = AnalysisDataStore::new(result("P1", &["battery", "price"]));
        let changed = store.replace(result("P2", &["screen", "price"]));
        assert!(changed);
        assert_eq!(store.default_selected_aspect(), Some("price"));
    }

    #[test]
    fn long_text_truncates_until_expanded() {
        let text = "x".repeat(200);
        let (shown, has_toggle) = display_text(&text, false);
        assert!(has_toggle);
        assert_eq!(shown.chars().count(), PREVIEW_LIMIT + 1);
        assert!(shown.ends_with('…'));

        let (full, has_toggle) = display_text(&text, true);
        assert!(has_toggle);
        assert_eq!(full, text);
    }

    #[test]
    fn short_text_never_shows_a_toggle() {
        let text = "y".repeat(PREVIEW_LIMIT);
        let (shown, has_toggle) = display_text(&text, false);
        assert!(!has_toggle);
        assert_eq!(shown, text);
        // expansion state is irrelevant below the limit
        assert_eq!(display_text(&text, true), (text.clone(), false));
    }

    #[test]
    fn confidence_formats_to_one_decimal() {
        assert_eq!(confidence_pct(0.923), "92.3%");
        assert_eq!(confidence_pct(1.0), "100.0%");
        assert_eq!(confidence_pct(0.0), "0.0%");
        // out-of-range input passes through unclamped
        assert_eq!(confidence_pct(1.5), "150.0%");
    }

    #[test]
    fn majority_label_prefers_earlier_on_tie() {
        let series = vec![
            ("Neutral".to_string(), 4),
            ("Positive".to_string(), 4),
            ("Negative".to_string(), 1),
        ];
        assert_eq!(majority_label(&series), Some("Neutral"));
        assert_eq!(majority_label(&[]), None);
    }

    #[test]
    fn absent_aspect_yields_empty_buckets() {
        let store = AnalysisDataStore::new(result("P1", &["battery"]));
        let buckets = store.buckets_for("warranty");
        assert!(buckets.positive.is_empty());
        assert!(buckets.neutral.is_empty());
        assert!(buckets.negative.is_empty());
    }
}
