use std::collections::HashMap;

use crate::models::{AnalysisResult, ExampleBuckets, ReviewExample};
use crate::store::{self, AnalysisDataStore};

/// Identity of one example list in the display: the two global top-review
/// columns, or one (aspect, label) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    TopPositive,
    TopNegative,
    Aspect { aspect: String, label: String },
}

pub type ExampleKey = (Bucket, usize);

/// What the rendering layer needs for one example card.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleView {
    pub text: String,
    pub confidence: String,
    pub has_toggle: bool,
    pub expanded: bool,
}

/// Interactive view state scoped to one displayed product: expand/collapse
/// flags per example and the currently selected aspect. Switching products
/// drops all of it.
pub struct ResultPresenter {
    store: AnalysisDataStore,
    expanded: HashMap<ExampleKey, bool>,
    selected_aspect: Option<String>,
}

impl ResultPresenter {
    pub fn new(result: AnalysisResult) -> Self {
        let store = AnalysisDataStore::new(result);
        let selected_aspect = store.default_selected_aspect().map(str::to_string);
        ResultPresenter {
            store,
            expanded: HashMap::new(),
            selected_aspect,
        }
    }

    pub fn store(&self) -> &AnalysisDataStore {
        &self.store
    }

    pub fn selected_aspect(&self) -> Option<&str> {
        self.selected_aspect.as_deref()
    }

    /// Any name is accepted, including one absent from the payload; absent
    /// aspects render as empty buckets.
    pub fn select_aspect(&mut self, name: &str) {
        self.selected_aspect = Some(name.to_string());
    }

    /// Examples for the currently selected aspect.
    pub fn selected_buckets(&self) -> ExampleBuckets {
        match &self.selected_aspect {
            Some(aspect) => self.store.buckets_for(aspect),
            None => ExampleBuckets::default(),
        }
    }

    pub fn is_expanded(&self, key: &ExampleKey) -> bool {
        self.expanded.get(key).copied().unwrap_or(false)
    }

    /// Flip the expand flag at `key`, creating it if absent.
    pub fn toggle_example(&mut self, key: ExampleKey) {
        let flag = self.expanded.entry(key).or_insert(false);
        *flag = !*flag;
    }

    /// Replace the displayed product. A different product clears the expand
    /// map and re-seeds the aspect selection from the new default.
    pub fn show(&mut self, result: AnalysisResult) {
        let changed = self.store.replace(result);
        if changed {
            self.expanded.clear();
            self.selected_aspect = self.store.default_selected_aspect().map(str::to_string);
        }
    }

    pub fn example_view(&self, bucket: Bucket, index: usize, example: &ReviewExample) -> ExampleView {
        let expanded = self.is_expanded(&(bucket, index));
        let (text, has_toggle) = store::display_text(&example.text, expanded);
        ExampleView {
            text,
            confidence: store::confidence_pct(example.confidence),
            has_toggle,
            expanded,
        }
    }
}
