use chrono::SecondsFormat;

use crate::age::{self, AgeBreakdown};
use crate::age_info::AgeInfo;
use crate::time_source::AcquiredInstant;

pub const LOADING_TEXT: &str = "Loading current time...";
pub const PROMPT_TEXT: &str = "Enter your birth date to calculate age.";

/// View state of the age calculator: one birth-date input, one reference
/// instant per run, and the breakdown derived from both.
#[derive(Debug, Default)]
pub struct Widget {
    birth_input: String,
    now: Option<AcquiredInstant>,
    age: Option<AgeBreakdown>,
    display: AgeInfo,
}

impl Widget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.now.is_none()
    }

    pub fn instant(&self) -> Option<AcquiredInstant> {
        self.now
    }

    pub fn birth_input(&self) -> &str {
        &self.birth_input
    }

    pub fn age(&self) -> Option<AgeBreakdown> {
        self.age
    }

    /// Record the reference instant. Input typed while loading waits for the
    /// next change event.
    pub fn set_instant(&mut self, acquired: AcquiredInstant) {
        self.now = Some(acquired);
    }

    /// Input-change event.
    pub fn on_birth_date_change(&mut self, input: &str) {
        self.birth_input = input.trim().to_string();

        let Some(now) = self.now else {
            return;
        };

        let birth = age::parse_birth_date(&self.birth_input);
        self.age = age::compute(birth, now.instant);
        let text = self.age.map(|a| a.to_string()).unwrap_or_default();
        self.display.set_attribute("age", &text);
    }

    pub fn result_text(&self) -> &str {
        if self.is_loading() {
            LOADING_TEXT
        } else if self.age.is_some() {
            self.display.text_content()
        } else {
            PROMPT_TEXT
        }
    }

    /// Human-readable current UTC time, once known.
    pub fn utc_text(&self) -> Option<String> {
        self.now.map(|now| {
            format!(
                "Current UTC Time: {}",
                now.instant.format("%a, %d %b %Y %H:%M:%S GMT")
            )
        })
    }

    /// Machine-readable current UTC time, once known.
    pub fn utc_timestamp(&self) -> Option<String> {
        self.now
            .map(|now| now.instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}
