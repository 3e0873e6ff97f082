//! Configuration I/O (YAML/Env loading)
//!
//! Defines the YAML schema. Conversion into `InstrumentationConfig` lives in
//! `mod.rs` next to the defaults it overrides.

use serde::{Deserialize, Serialize};

/// Schema versions this build understands
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
///
/// ```yaml
/// version: 1
/// output_dir: build/keypoints
/// dictionary_file: branch_dictionary.txt
/// counter_file: counter.log
/// lock:
///   enabled: true
///   attempts: 100
///   retry_ms: 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockSection>,
}

/// Counter lock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_ms: Option<u64>,
}
