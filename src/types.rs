/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Actions recorded in the document audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    Created,
    Updated,
    Deleted,
    VersionUploaded,
}

impl DocumentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentAction::Created => "created",
            DocumentAction::Updated => "updated",
            DocumentAction::Deleted => "deleted",
            DocumentAction::VersionUploaded => "version_uploaded",
        }
    }
}

impl std::fmt::Display for DocumentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_match_serde() {
        for action in [
            DocumentAction::Created,
            DocumentAction::Updated,
            DocumentAction::Deleted,
            DocumentAction::VersionUploaded,
        ] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, action.as_str());
        }
    }
}
