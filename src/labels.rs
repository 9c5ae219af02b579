use std::collections::HashMap;

use smallvec::SmallVec;

/// An ordered list of label key/value pairs.
///
/// Labels are built from a flat, alternating `key, value, key, value, ...`
/// sequence and keep the order they were given in. The order is part of a
/// metric's identity: `["a", "1", "b", "2"]` and `["b", "2", "a", "1"]` name two
/// different metrics, and produce two different Graphite paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Labels {
    pairs: SmallVec<[(String, String); 4]>,
}

impl Labels {
    /// Build labels from an alternating key/value sequence.
    ///
    /// # Panics
    ///
    /// Panics if the sequence has an odd number of items. That is always a
    /// mismatched key/value list at the call site.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items = items.into_iter();
        let mut pairs = SmallVec::new();
        let mut count = 0;
        while let Some(key) = items.next() {
            count += 1;
            let Some(value) = items.next() else {
                panic!("labels must alternate keys and values, got {count} items");
            };
            count += 1;
            pairs.push((key.into(), value.into()));
        }
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The label keys in their original order.
    pub fn keys(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Join the label values with `.`, in order. Any `separator` found inside a
    /// value is replaced with `escape` first so the joined path stays
    /// unambiguous.
    pub fn path(&self, separator: &str, escape: &str) -> String {
        let mut path = String::new();
        for (i, (_, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                path.push('.');
            }
            if separator.is_empty() {
                path.push_str(value);
            } else {
                path.push_str(&value.replace(separator, escape));
            }
        }
        path
    }

    /// A key -> value view of the labels. When a key repeats, the last value
    /// wins.
    pub fn map(&self) -> HashMap<&str, &str> {
        self.iter().collect()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Labels {
    fn from(items: [S; N]) -> Self {
        Self::new(items)
    }
}

impl<S: Into<String>> From<Vec<S>> for Labels {
    fn from(items: Vec<S>) -> Self {
        Self::new(items)
    }
}
