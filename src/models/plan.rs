use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A single grouping suggested by the model: move `files_to_move` from the
/// base directory into `folder_name` (relative to the base, may be nested).
///
/// Immutable once parsed. Whether the user accepted it lives in [`Approvals`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChange {
    pub folder_name: String,
    pub files_to_move: Vec<String>,
    #[serde(default = "default_true")]
    pub is_new_folder: bool,
}

impl ProposedChange {
    pub fn new(folder_name: &str, files_to_move: &[&str], is_new_folder: bool) -> Self {
        Self {
            folder_name: folder_name.to_string(),
            files_to_move: files_to_move.iter().map(|f| f.to_string()).collect(),
            is_new_folder,
        }
    }
}

/// Caller-owned approval state for a plan, keyed by change index.
/// Every change is approved until explicitly rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Approvals {
    rejected: BTreeSet<usize>,
}

impl Approvals {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn rejecting(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            rejected: indices.into_iter().collect(),
        }
    }

    pub fn set(&mut self, index: usize, approved: bool) {
        if approved {
            self.rejected.remove(&index);
        } else {
            self.rejected.insert(index);
        }
    }

    pub fn is_approved(&self, index: usize) -> bool {
        !self.rejected.contains(&index)
    }

    pub fn approved_count(&self, plan_len: usize) -> usize {
        (0..plan_len).filter(|idx| self.is_approved(*idx)).count()
    }
}
