//! Ordering and pagination over materialised rows.

use std::cmp::Ordering;

use relayql_core::Record;
use relayql_storage::{FindOptions, SortParam, compare_values};
use serde_json::Value;

/// Rank used when two values are not comparable: nulls first, then by JSON kind.
fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    let a = a.get(field).unwrap_or(&Value::Null);
    let b = b.get(field).unwrap_or(&Value::Null);
    compare_values(a, b).unwrap_or_else(|| kind_rank(a).cmp(&kind_rank(b)))
}

/// Stable sort by every key in turn.
pub fn apply_order(rows: &mut [Record], order: &[SortParam]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|sort| {
                let ordering = compare_field(a, b, &sort.field);
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Filters, orders and slices `rows` according to `options`.
pub fn execute<'a>(rows: impl Iterator<Item = &'a Record>, options: &FindOptions) -> Vec<Record> {
    let mut matched: Vec<Record> = rows
        .filter(|row| options.filter.matches(row))
        .cloned()
        .collect();
    apply_order(&mut matched, &options.order);

    let offset = options.offset.unwrap_or(0);
    let limit = options.limit.unwrap_or(usize::MAX);
    matched.into_iter().skip(offset).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayql_storage::Filter;
    use serde_json::json;

    fn rows() -> Vec<Record> {
        [
            json!({"id": 1, "text": "b", "done": false}),
            json!({"id": 2, "text": "a", "done": true}),
            json!({"id": 3, "text": null, "done": false}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
    }

    fn ids(rows: &[Record]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_order_nulls_first() {
        let mut rows = rows();
        apply_order(&mut rows, &[SortParam::asc("text")]);
        assert_eq!(ids(&rows), vec![3, 2, 1]);

        apply_order(&mut rows, &[SortParam::desc("text")]);
        assert_eq!(ids(&rows), vec![1, 2, 3]);
    }

    #[test]
    fn test_multi_key_order() {
        let mut rows = rows();
        apply_order(&mut rows, &[SortParam::asc("done"), SortParam::desc("id")]);
        assert_eq!(ids(&rows), vec![3, 1, 2]);
    }

    #[test]
    fn test_execute_filters_and_paginates() {
        let rows = rows();
        let options = FindOptions::new()
            .with_filter(Filter::new().eq("done", false))
            .with_sort("id", true)
            .with_offset(1)
            .with_limit(5);
        assert_eq!(ids(&execute(rows.iter(), &options)), vec![1]);
    }
}
