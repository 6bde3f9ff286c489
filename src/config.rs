//! @ai:module:intent Configuration: queue access, cache location and the questions to answer
//! @ai:module:layer infrastructure
//! @ai:module:public_api UsageConfig, QueueConfig, PathConfig, QuestionConfig, FilterConfig
//! @ai:module:stateless true

use crate::error::Result;
use crate::usage::{ClassificationConfig, MultiplierRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Main configuration file (taskcost.toml)
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageConfig {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub questions: Vec<QuestionConfig>,
}

/// @ai:intent Task-queue service settings
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_root_url")]
    pub root_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// @ai:intent Filesystem locations
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

/// @ai:intent One question: a task group and the rules for classifying its tasks
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Checked in declared order; the first matching prefix wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multipliers: Vec<MultiplierRule>,
}

/// @ai:intent Filter for selecting questions to run
/// @ai:effects pure
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub labels: Option<Vec<String>>,
    pub group_ids: Option<Vec<String>>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_root_url() -> String {
    "https://firefox-ci-tc.services.mozilla.com".to_string()
}

fn default_page_size() -> u32 {
    1000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

impl UsageConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Compile every question's rules, failing on the first invalid one
    /// @ai:effects pure
    pub fn classifications(&self) -> Result<Vec<ClassificationConfig>> {
        self.questions
            .iter()
            .map(QuestionConfig::classification)
            .collect()
    }

    /// @ai:intent The DevEdition-vs-Beta release cost comparison
    /// @ai:effects pure
    pub fn sample() -> Self {
        let full_build = Some("Time spent on full build".to_string());
        let repacking = Some("Estimated time spent by repacking".to_string());

        let questions = vec![
            QuestionConfig {
                label: "on-push compile".to_string(),
                section: full_build.clone(),
                group_id: "SC__1kWXR4esb499TFHyPQ".to_string(),
                include: Some(strings(&[".*-devedition-.*"])),
                exclude: Some(strings(&["^test.*"])),
                multipliers: vec![],
            },
            QuestionConfig {
                label: "on-push all deved tests".to_string(),
                section: full_build.clone(),
                group_id: "SC__1kWXR4esb499TFHyPQ".to_string(),
                include: Some(strings(&["^test-.*devedition"])),
                exclude: None,
                multipliers: vec![],
            },
            QuestionConfig {
                label: "release promote".to_string(),
                section: full_build.clone(),
                group_id: "N5fSRkSZQsOteqDPo8tOJA".to_string(),
                include: None,
                exclude: Some(strings(&[
                    "^release-bouncer-sub-devedition",
                    "^release-early-tagging-devedition",
                    "^release-generate-checksums-devedition-.*",
                    "^release-notify-promote-devedition",
                    "^release-source-.*",
                    "^release-update-verify-config-devedition-.*",
                    "^release-update-verify-devedition-.*",
                    "^sign-and-push-langpacks-.*",
                ])),
                multipliers: vec![],
            },
            QuestionConfig {
                label: "release push".to_string(),
                section: full_build.clone(),
                group_id: "H3QyLn2HRxixA3cw1ulgew".to_string(),
                include: None,
                exclude: Some(strings(&[".*"])),
                multipliers: vec![],
            },
            QuestionConfig {
                label: "release ship".to_string(),
                section: full_build,
                group_id: "a13b0N6gSE-eCKVo4UOXig".to_string(),
                include: Some(strings(&[
                    "release-balrog-scheduling-devedition",
                    "release-mark-as-shipped-devedition",
                    "release-notify-ship-devedition",
                ])),
                exclude: None,
                multipliers: vec![],
            },
            QuestionConfig {
                label: "release EME-free repack".to_string(),
                section: repacking,
                group_id: "DgylP9ewT_2-SLCclTex0A".to_string(),
                include: Some(strings(&["^release-eme-free-.*"])),
                exclude: None,
                multipliers: vec![
                    MultiplierRule::new("release-eme-free-repack-macosx64-nightly", 3.0),
                    MultiplierRule::new("release-eme-free-repack-repackage-signing-macosx64", 3.0),
                    MultiplierRule::new("release-eme-free-repack-beetmover-macosx64", 3.0),
                    MultiplierRule::new("release-eme-free-repack-beetmover-checksums-macosx64", 3.0),
                ],
            },
        ];

        Self {
            questions,
            ..Default::default()
        }
    }
}

impl QuestionConfig {
    /// @ai:intent Compile this question's include/exclude/multiplier rules
    /// @ai:effects pure
    pub fn classification(&self) -> Result<ClassificationConfig> {
        ClassificationConfig::new(
            self.include.clone(),
            self.exclude.clone(),
            self.multipliers.clone(),
        )
    }
}

impl FilterConfig {
    /// @ai:intent Check if filter matches a question
    /// @ai:effects pure
    pub fn matches(&self, question: &QuestionConfig) -> bool {
        let label_match = self
            .labels
            .as_ref()
            .map(|l| l.iter().any(|label| label == &question.label))
            .unwrap_or(true);

        let group_match = self
            .group_ids
            .as_ref()
            .map(|g| g.iter().any(|id| id == &question.group_id))
            .unwrap_or(true);

        label_match && group_match
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
