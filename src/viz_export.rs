// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};

use crate::store::AnalysisDataStore;

/// Write the chart-ready JSONs for one analyzed product into `out/<date>/`.
/// The files mirror what the charts consume: the sentiment pie series in
/// server order and one bar row per aspect.
pub fn write_all_viz(out_dir: &Path, date: &str, store: &AnalysisDataStore) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    let sentiment: Vec<_> = store
        .sentiment_series()
        .into_iter()
        .map(|(label, count)| json!({ "name": label, "value": count }))
        .collect();
    write_json(out_dir.join("viz.sentiment.json"), &sentiment)?;

    let aspects: Vec<_> = store
        .aspect_series()
        .into_iter()
        .map(|row| {
            json!({
                "aspect": row.aspect,
                "Positive": row.positive,
                "Negative": row.negative,
                "Neutral": row.neutral,
            })
        })
        .collect();
    write_json(out_dir.join("viz.aspects.json"), &aspects)?;

    let idx = json!({
        "date": date,
        "version": 1,
        "product_id": store.product_id(),
        "counts": {
            "reviews": store.result().total_reviews,
            "aspects": store.aspect_series().len(),
        },
        "files": [
            "viz.sentiment.json",
            "viz.aspects.json"
        ]
    });
    write_json(out_dir.join("viz.index.json"), &idx)?;

    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .map(|_| ())
        .map_err(|e| e.into())
}
