use serde::Serialize;
use std::collections::HashMap;

pub use shared::models::ratios::{percentage, ratio, round_to};

/// Running monetary sums for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub submitted: f64,
    pub denied: f64,
    pub approved: f64,
    /// Number of contributions (claims or line items, depending on the bucket)
    pub count: u64,
    /// Contributions with a denial above the noise threshold
    pub denied_count: u64,
}

impl Totals {
    pub fn add(&mut self, submitted: f64, denied: f64, approved: f64, is_denied: bool) {
        self.submitted += submitted;
        self.denied += denied;
        self.approved += approved;
        self.count += 1;
        if is_denied {
            self.denied_count += 1;
        }
    }

    pub fn denial_rate(&self) -> f64 {
        round_to(percentage(self.denied, self.submitted), 2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketEntry<A> {
    pub key: String,
    /// Text shown for the bucket: the first spelling seen for `key`
    pub label: String,
    pub value: A,
}

/// Key → accumulator map that remembers first-encounter order.
///
/// Keys are unique. Iteration and rankings follow the order in which keys
/// were first seen, which makes every ranking stable on ties.
#[derive(Debug, Clone)]
pub struct AggregateBucket<A> {
    index: HashMap<String, usize>,
    entries: Vec<BucketEntry<A>>,
}

impl<A: Default> Default for AggregateBucket<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Default> AggregateBucket<A> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Accumulator for `key`, created on first use with `label` as its display text.
    pub fn entry(&mut self, key: &str, label: &str) -> &mut A {
        let position = match self.index.get(key) {
            Some(position) => *position,
            None => {
                self.entries.push(BucketEntry {
                    key: key.to_string(),
                    label: label.to_string(),
                    value: A::default(),
                });
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[position].value
    }

    pub fn get(&self, key: &str) -> Option<&A> {
        self.index.get(key).map(|position| &self.entries[*position].value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketEntry<A>> {
        self.entries.iter()
    }

    /// Entries sorted by `metric` descending, ties kept in encounter order.
    pub fn ranked_by<F>(&self, metric: F, limit: usize) -> Vec<&BucketEntry<A>>
    where
        F: Fn(&A) -> f64,
    {
        let mut ranked: Vec<&BucketEntry<A>> = self.entries.iter().collect();
        ranked.sort_by(|a, b| metric(&b.value).total_cmp(&metric(&a.value)));
        ranked.truncate(limit);
        ranked
    }
}
