use crate::graph::LoopPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Identifier of the project start event; later events count up from it.
    pub start_event: u32,
    /// Run the simplifier before the critical path search.
    pub simplify: bool,
    pub loop_policy: LoopPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_event: 0,
            simplify: true,
            loop_policy: LoopPolicy::StopAfterShrink,
        }
    }
}
