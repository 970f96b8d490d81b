//! Storage-eligibility strategies.
//!
//! Decides whether a network response fetched on a cache miss may be
//! written back to the store.

use serde::{Deserialize, Serialize};

use crate::cache::ResponseType;

/// Which network responses are written to the store after a cache miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoragePolicy {
    /// Store everything except requests whose URL contains one of the
    /// substrings (auth backends and the like).
    ExcludeUrlSubstring {
        #[serde(default = "default_excluded_substrings")]
        substrings: Vec<String>,
    },

    /// Store only `200` responses of type `basic`.
    SuccessfulBasicOnly,
}

fn default_excluded_substrings() -> Vec<String> {
    vec!["firebase".into()]
}

impl Default for StoragePolicy {
    fn default() -> Self {
        StoragePolicy::ExcludeUrlSubstring { substrings: default_excluded_substrings() }
    }
}

impl StoragePolicy {
    /// Whether a response to `url` may be stored.
    pub fn allows(&self, url: &str, status: u16, response_type: ResponseType) -> bool {
        match self {
            StoragePolicy::ExcludeUrlSubstring { substrings } => !substrings.iter().any(|s| url.contains(s.as_str())),
            StoragePolicy::SuccessfulBasicOnly => status == 200 && response_type == ResponseType::Basic,
        }
    }

    /// Serialized `kind` tag of this policy, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            StoragePolicy::ExcludeUrlSubstring { .. } => "exclude_url_substring",
            StoragePolicy::SuccessfulBasicOnly => "successful_basic_only",
        }
    }
}
