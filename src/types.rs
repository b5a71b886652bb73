use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Whether the search looks for the minimum or the maximum of the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationDirection {
    #[default]
    Maximize,
    Minimize,
}

impl OptimizationDirection {
    /// Orders two fitness values so that the better one compares as `Less`.
    ///
    /// Sorting ascending with this comparator puts the optimum at index 0.
    pub fn rank(self, a: f64, b: f64) -> Ordering {
        match self {
            OptimizationDirection::Maximize => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            OptimizationDirection::Minimize => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    /// True when `candidate` is strictly better than `incumbent`
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.rank(candidate, incumbent) == Ordering::Less
    }

    pub fn label(self) -> &'static str {
        match self {
            OptimizationDirection::Maximize => "maximize",
            OptimizationDirection::Minimize => "minimize",
        }
    }
}

/// How the merged population is cut back to the population cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruningPolicy {
    /// Keep the elite, fill the rest by uniform sampling without replacement
    #[default]
    RandomSample,
    /// Keep the elite and the next best, in rank order
    Truncation,
}
