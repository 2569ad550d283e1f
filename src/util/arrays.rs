// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Array and JSON-array helpers

use serde_json::Value;

/// Split a slice into chunks of at most `size` elements
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).map(|c| c.to_vec()).collect()
}

/// Remove duplicates, keeping the first occurrence of each
pub fn dedup_preserving_order<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Flatten nested JSON arrays into one level
pub fn flatten(value: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    collect(value, &mut out);
    out
}

fn collect(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        other => out.push(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk() {
        assert_eq!(chunk(&[1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert!(chunk(&[1, 2], 0).is_empty());
    }

    #[test]
    fn test_dedup_preserving_order() {
        assert_eq!(dedup_preserving_order(&["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_flatten() {
        let nested = json!([1, [2, [3, 4]], 5]);
        assert_eq!(
            flatten(&nested),
            vec![json!(1), json!(2), json!(3), json!(4), json!(5)]
        );
    }

    #[test]
    fn test_flatten_scalar() {
        assert_eq!(flatten(&json!("x")), vec![json!("x")]);
    }
}
