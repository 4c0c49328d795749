//! Default value functions used by serde for config deserialization.

use crate::links::{TUTORIAL_SEARCH_URL, TUTORIAL_SUFFIX, WORKOUT_KW};

pub fn default_name() -> String {
    "Stride".to_string()
}

pub fn default_data_dir() -> String {
    "~/.stride".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_backend() -> String {
    "http".to_string()
}

pub fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

pub fn default_timeout_secs() -> u64 {
    10
}

pub fn default_debounce_ms() -> u64 {
    300
}

pub fn default_keywords() -> Vec<String> {
    WORKOUT_KW.iter().map(|k| k.to_string()).collect()
}

pub fn default_search_url() -> String {
    TUTORIAL_SEARCH_URL.to_string()
}

pub fn default_suffix() -> String {
    TUTORIAL_SUFFIX.to_string()
}
