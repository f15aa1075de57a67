use serde::{Deserialize, Serialize};

use crate::util::locale::Locale;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
    /// What a trackable item is called in messages ("task", "tracker", ...)
    #[serde(default = "default_noun")]
    pub noun: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            locale: Locale::default(),
            noun: default_noun(),
        }
    }
}

fn default_noun() -> String {
    "tracker".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum task name length in grapheme clusters
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_name_len: default_max_name_len(),
        }
    }
}

fn default_max_name_len() -> usize {
    38
}
