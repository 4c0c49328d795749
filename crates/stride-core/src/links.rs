//! Tutorial link resolution for workout reminders.

use crate::config::LinksConfig;
use crate::model::TaskKind;

/// Keywords that mark a reminder as a workout.
pub const WORKOUT_KW: &[&str] = &[
    "pushup", "squat", "yoga", "run", "cardio", "workout", "stretch", "plank", "bench", "deadlift",
    "gym",
];

/// Default tutorial search endpoint; the encoded query is appended.
pub const TUTORIAL_SEARCH_URL: &str = "https://www.youtube.com/results?search_query=";

/// Appended to the reminder text before encoding.
pub const TUTORIAL_SUFFIX: &str = " tutorial";

/// Maps reminder text to an optional tutorial search link.
///
/// Matching is a case-insensitive substring test, so "Running" and
/// "Treadmill run" both hit `run`.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    keywords: Vec<String>,
    search_url: String,
    suffix: String,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self {
            keywords: WORKOUT_KW.iter().map(|k| k.to_string()).collect(),
            search_url: TUTORIAL_SEARCH_URL.to_string(),
            suffix: TUTORIAL_SUFFIX.to_string(),
        }
    }
}

impl LinkResolver {
    pub fn from_config(cfg: &LinksConfig) -> Self {
        Self {
            keywords: cfg
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            search_url: cfg.search_url.clone(),
            suffix: cfg.suffix.clone(),
        }
    }

    pub fn is_workout(&self, text: &str) -> bool {
        let normalized = text.to_lowercase();
        self.keywords.iter().any(|kw| normalized.contains(kw.as_str()))
    }

    pub fn classify(&self, text: &str) -> TaskKind {
        if self.is_workout(text) {
            TaskKind::Workout
        } else {
            TaskKind::General
        }
    }

    /// Tutorial link embedding the exact text, or `None` for non-workouts.
    pub fn resolve(&self, text: &str) -> Option<String> {
        if !self.is_workout(text) {
            return None;
        }
        let query = format!("{text}{}", self.suffix);
        Some(format!("{}{}", self.search_url, urlencoding::encode(&query)))
    }
}
