//! Conversion between Sky's grouped aggregate trees and flat rows.
//!
//! A query grouped by `country` then `gender` comes back as
//!
//! ```text
//! {"country": {"US": {"gender": {"male": {"count": 1}, "female": {"count": 3}}}}}
//! ```
//!
//! `denormalize` flattens that into one row per leaf
//! (`{"country": "US", "gender": "male", "count": 1}`, ...) and `normalize`
//! rebuilds the tree from such rows. Both walk maps in insertion order, so
//! row order follows the order in which groups were first seen.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{Result, SkyError};

/// One leaf of a grouped aggregation: dimension values and metric values in
/// a single flat map.
pub type AggregateRow = Map<String, Value>;

/// Flatten an aggregate tree grouped by `dimension_names` (outer to inner).
///
/// With no dimensions the tree itself is the metric map and a single row is
/// returned. Empty groups at the innermost level produce no rows.
pub fn denormalize<S: AsRef<str>>(
    tree: &Value,
    dimension_names: &[S],
) -> Result<Vec<AggregateRow>> {
    let mut rows = Vec::new();
    let mut path = Vec::with_capacity(dimension_names.len());
    flatten(tree, dimension_names, &mut path, &mut rows)?;
    Ok(rows)
}

fn flatten<S: AsRef<str>>(
    node: &Value,
    dimension_names: &[S],
    path: &mut Vec<(String, String)>,
    rows: &mut Vec<AggregateRow>,
) -> Result<()> {
    let map = node
        .as_object()
        .ok_or_else(|| SkyError::malformed(format!("expected a map at depth {}", path.len())))?;

    let Some((dimension, inner)) = dimension_names.split_first() else {
        let mut row = AggregateRow::new();
        for (name, value) in path.iter() {
            row.insert(name.clone(), Value::String(value.clone()));
        }
        for (metric, value) in map {
            if value.is_object() || value.is_array() {
                return Err(SkyError::malformed(format!(
                    "metric '{metric}' is nested deeper than {} dimension(s)",
                    path.len()
                )));
            }
            row.insert(metric.clone(), value.clone());
        }
        rows.push(row);
        return Ok(());
    };

    let dimension = dimension.as_ref();
    let groups = map
        .get(dimension)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            SkyError::malformed(format!("missing grouping for dimension '{dimension}'"))
        })?;

    for (key, subtree) in groups {
        if inner.is_empty() && subtree.as_object().is_some_and(Map::is_empty) {
            continue;
        }
        path.push((dimension.to_string(), key.clone()));
        flatten(subtree, inner, path, rows)?;
        path.pop();
    }
    Ok(())
}

/// Build the aggregate tree for `rows`, nesting by `dimension_names` (outer to
/// inner) and keeping only `metric_names` at the leaves.
///
/// Each full dimension path must identify exactly one row. With no
/// dimensions, `rows` must hold exactly one row and its metric map is
/// returned.
pub fn normalize<S: AsRef<str>, M: AsRef<str>>(
    rows: &[AggregateRow],
    dimension_names: &[S],
    metric_names: &[M],
) -> Result<Value> {
    let rows: Vec<&AggregateRow> = rows.iter().collect();
    nest(&rows, dimension_names, metric_names)
}

fn nest<S: AsRef<str>, M: AsRef<str>>(
    rows: &[&AggregateRow],
    dimension_names: &[S],
    metric_names: &[M],
) -> Result<Value> {
    let Some((dimension, inner)) = dimension_names.split_first() else {
        let [row] = rows else {
            return Err(SkyError::malformed(format!(
                "{} rows share one group; expected exactly one",
                rows.len()
            )));
        };
        return metrics_of(row, metric_names).map(Value::Object);
    };

    let dimension = dimension.as_ref();
    let mut partitions: Vec<(String, Vec<&AggregateRow>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for &row in rows {
        let value = row
            .get(dimension)
            .ok_or_else(|| SkyError::malformed(format!("row is missing dimension '{dimension}'")))?;
        let key = group_key(dimension, value)?;
        match index.get(&key) {
            Some(&slot) => partitions[slot].1.push(row),
            None => {
                index.insert(key.clone(), partitions.len());
                partitions.push((key, vec![row]));
            }
        }
    }

    let mut groups = Map::new();
    for (key, members) in partitions {
        groups.insert(key, nest(&members, inner, metric_names)?);
    }
    let mut level = Map::new();
    level.insert(dimension.to_string(), Value::Object(groups));
    Ok(Value::Object(level))
}

fn metrics_of<M: AsRef<str>>(row: &AggregateRow, metric_names: &[M]) -> Result<Map<String, Value>> {
    let mut metrics = Map::new();
    for metric in metric_names {
        let metric = metric.as_ref();
        let value = row
            .get(metric)
            .ok_or_else(|| SkyError::malformed(format!("row is missing metric '{metric}'")))?;
        metrics.insert(metric.to_string(), value.clone());
    }
    Ok(metrics)
}

/// Tree keys are strings and `denormalize` yields strings, so only string
/// dimension values survive a round trip.
fn group_key(dimension: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(SkyError::malformed(format!(
            "dimension '{dimension}' must be a string, got {other}"
        ))),
    }
}
