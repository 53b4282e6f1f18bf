//! Row identity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an underlying table row.
///
/// Channels may key rows by an integer row id, a scalar primary key, or a
/// composite primary key. The total ordering on keys is used as the final
/// tie-break when fused scores are exactly equal, so fusion output is
/// reproducible regardless of input iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    /// Integer primary key or implicit row id.
    Int(i64),
    /// String primary key.
    Text(String),
    /// Composite primary key, one string per column in key order.
    Composite(Vec<String>),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(id) => write!(f, "{}", id),
            RowKey::Text(id) => write!(f, "{}", id),
            RowKey::Composite(parts) => write!(f, "({})", parts.join(", ")),
        }
    }
}

impl From<i64> for RowKey {
    fn from(id: i64) -> Self {
        RowKey::Int(id)
    }
}

impl From<&str> for RowKey {
    fn from(id: &str) -> Self {
        RowKey::Text(id.to_string())
    }
}

impl From<String> for RowKey {
    fn from(id: String) -> Self {
        RowKey::Text(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_total_and_stable() {
        let mut keys = vec![
            RowKey::Text("b".into()),
            RowKey::Int(2),
            RowKey::Text("a".into()),
            RowKey::Int(1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                RowKey::Int(1),
                RowKey::Int(2),
                RowKey::Text("a".into()),
                RowKey::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RowKey::Int(42).to_string(), "42");
        assert_eq!(RowKey::from("doc-1").to_string(), "doc-1");
        assert_eq!(
            RowKey::Composite(vec!["us".into(), "42".into()]).to_string(),
            "(us, 42)"
        );
    }
}
