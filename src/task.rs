use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One unit of work. Only `max_duration` feeds the critical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task<T: Ord> {
    pub id: T,
    #[serde(default)]
    pub required: BTreeSet<T>,
    pub min_duration: f64,
    pub max_duration: f64,
}

impl<T: Ord> Task<T> {
    pub fn new(
        id: T,
        required: impl IntoIterator<Item = T>,
        min_duration: f64,
        max_duration: f64,
    ) -> Self {
        Self {
            id,
            required: required.into_iter().collect(),
            min_duration,
            max_duration,
        }
    }

    pub fn requires(&self, id: &T) -> bool {
        self.required.contains(id)
    }

    pub fn is_root(&self) -> bool {
        self.required.is_empty()
    }
}
