// src/render.rs
use crate::compare::ComparisonOutcome;
use crate::models::{ReviewExample, SENTIMENT_LABELS};
use crate::presenter::{Bucket, ResultPresenter};

/// Render one product's analysis as markdown. Consumes only presenter/store
/// view models; all truncation and formatting decisions happen there.
pub fn render_analysis(presenter: &ResultPresenter) -> String {
    let store = presenter.store();
    let result = store.result();
    let mut md = String::new();

    md.push_str(&format!("# AI Insights — {}\n\n", result.product_id));
    md.push_str(&format!("Reviews analyzed: {}\n\n", result.total_reviews));

    let sentiments = store.sentiment_series();
    if !sentiments.is_empty() {
        md.push_str("## Sentiment Distribution\n");
        for (label, count) in &sentiments {
            md.push_str(&format!("- {}: {}\n", label, count));
        }
        md.push('\n');
    }

    let aspects = store.aspect_series();
    if !aspects.is_empty() {
        md.push_str("## Aspect Breakdown\n");
        md.push_str("| Aspect | Positive | Negative | Neutral |\n");
        md.push_str("|---|---|---|---|\n");
        for row in &aspects {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.aspect, row.positive, row.negative, row.neutral
            ));
        }
        md.push('\n');
    }

    if !result.top_positive.is_empty() || !result.top_negative.is_empty() {
        md.push_str("## Top Reviews\n\n");
        push_example_column(
            &mut md,
            presenter,
            "Positive Highlights",
            Bucket::TopPositive,
            &result.top_positive,
        );
        push_example_column(
            &mut md,
            presenter,
            "Negative Highlights",
            Bucket::TopNegative,
            &result.top_negative,
        );
    }

    md.push_str("## AI Summary\n");
    if result.summary.is_empty() {
        md.push_str("No summary available.\n\n");
    } else {
        md.push_str(&format!("{}\n\n", result.summary.trim()));
    }

    if let Some(aspect) = presenter.selected_aspect() {
        let buckets = presenter.selected_buckets();
        let counts = result.aspect_counts(aspect).cloned().unwrap_or_default();
        md.push_str(&format!("## Aspect Highlights — {}\n", aspect));
        md.push_str(&format!(
            "P: {} | N: {} | U: {}\n\n",
            counts.positive, counts.negative, counts.neutral
        ));
        for label in SENTIMENT_LABELS {
            let examples = buckets.bucket(label);
            if examples.is_empty() {
                continue;
            }
            let bucket = Bucket::Aspect {
                aspect: aspect.to_string(),
                label: label.to_string(),
            };
            push_example_column(&mut md, presenter, label, bucket, examples);
        }
    }

    md
}

fn push_example_column(
    md: &mut String,
    presenter: &ResultPresenter,
    heading: &str,
    bucket: Bucket,
    examples: &[ReviewExample],
) {
    if examples.is_empty() {
        return;
    }
    md.push_str(&format!("### {}\n", heading));
    for (i, example) in examples.iter().enumerate() {
        let view = presenter.example_view(bucket.clone(), i, example);
        md.push_str(&format!("> “{}”\n", view.text));
        md.push_str(&format!("> Confidence: {}", view.confidence));
        if view.has_toggle {
            md.push_str(if view.expanded {
                " (expanded)"
            } else {
                " (truncated)"
            });
        }
        md.push_str("\n\n");
    }
}

/// Render a two-product comparison: both panels side by side (sequentially,
/// in markdown), the winner tables, and the narrative.
pub fn render_comparison(
    outcome: &ComparisonOutcome,
    left: &ResultPresenter,
    right: &ResultPresenter,
) -> String {
    let mut md = String::new();
    md.push_str("# Compare Products\n\n");

    for (title, report, presenter) in [
        ("Product 1", &outcome.product1, left),
        ("Product 2", &outcome.product2, right),
    ] {
        md.push_str(&format!(
            "## {} — {} ({})\n\n",
            title, report.analysis.product_id, report.sentiment_label
        ));
        md.push_str(&render_analysis(presenter));
        md.push('\n');
    }

    let comparison = &outcome.comparison;
    if !comparison.aspect_winners.is_empty() {
        md.push_str("## Aspect Winners\n");
        md.push_str("| Aspect | Winner | Scores |\n");
        md.push_str("|---|---|---|\n");
        for (aspect, winner) in &comparison.aspect_winners {
            let scores = winner
                .scores
                .iter()
                .map(|(pid, score)| format!("{}: {}", pid, score))
                .collect::<Vec<_>>()
                .join(", ");
            md.push_str(&format!("| {} | {} | {} |\n", aspect, winner.winner, scores));
        }
        md.push('\n');
    }

    if !comparison.overall_scores.is_empty() {
        md.push_str("## Overall\n");
        for (pid, score) in &comparison.overall_scores {
            md.push_str(&format!("- {}: {:.1}\n", pid, score));
        }
        md.push_str(&format!("- Winner: {}\n\n", comparison.overall_winner));
    }

    md.push_str("## AI Comparison Summary\n");
    if comparison.comparison_text.is_empty() {
        md.push_str("No comparison available. Please check if products have reviews.\n");
    } else {
        md.push_str(&format!("{}\n", comparison.comparison_text.trim()));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, AspectSentiments, ExampleBuckets};

    fn result(summary: &str) -> AnalysisResult {
        AnalysisResult {
            product_id: "P1".to_string(),
            total_reviews: 2,
            sentiments: vec![("Positive".to_string(), 2)],
            aspects: vec![(
                "battery".to_string(),
                AspectSentiments {
                    positive: 2,
                    negative: 0,
                    neutral: 0,
                },
            )],
            aspect_examples: vec![("battery".to_string(), ExampleBuckets::default())],
            top_positive: vec![ReviewExample {
                text: "w".repeat(200),
                confidence: 0.9,
            }],
            top_negative: vec![],
            summary: summary.to_string(),
        }
    }

    #[test]
    fn analysis_markdown_truncates_long_examples() {
        let presenter = ResultPresenter::new(result("Great battery"));
        let md = render_analysis(&presenter);
        assert!(md.contains("Sentiment Distribution"));
        assert!(md.contains("…"));
        assert!(md.contains("(truncated)"));
        assert!(md.contains("Confidence: 90.0%"));
        assert!(md.contains("Great battery"));
    }

    #[test]
    fn empty_summary_gets_fallback_text() {
        let presenter = ResultPresenter::new(result(""));
        let md = render_analysis(&presenter);
        assert!(md.contains("No summary available."));
    }
}
