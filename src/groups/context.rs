use serde::{Deserialize, Serialize};

/// How a node's own match combines with its descendants'.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyContext {
    /// Own result only; children never change it.
    #[default]
    Independent,
    /// Union with descendants.
    Including,
    /// Intersection with descendants.
    Refining,
}

impl HierarchyContext {
    /// Folds child results into `own`. An empty child list leaves `own` unchanged.
    pub fn combine(self, own: bool, mut children: impl Iterator<Item = bool>) -> bool {
        match self {
            Self::Independent => own,
            Self::Including => own || children.any(|hit| hit),
            Self::Refining => own && children.all(|hit| hit),
        }
    }
}
