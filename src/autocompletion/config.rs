use crate::autocompletion::session::DEFAULT_VISIBLE_LIMIT;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct AutocompletionConfig {
    visible_limit: usize,
    debounce_ms: u64,
}

impl Default for AutocompletionConfig {
    fn default() -> Self {
        Self {
            visible_limit: DEFAULT_VISIBLE_LIMIT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl AutocompletionConfig {
    pub fn visible_limit(&self) -> usize {
        self.visible_limit
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Apply a settings object. Keys may sit at the root or under an
    /// `expressionAutocompletion` section; unknown keys are ignored.
    pub fn apply_settings(&mut self, value: Value) {
        let Some(section) = settings_section(&value) else {
            return;
        };
        if let Some(limit) = section.get("visibleLimit").and_then(Value::as_u64) {
            self.visible_limit = sanitize_limit(limit, self.visible_limit);
        }
        // Zero disables debouncing.
        if let Some(delay) = section.get("debounceMs").and_then(Value::as_u64) {
            self.debounce_ms = delay;
        }
    }
}

fn sanitize_limit(value: u64, fallback: usize) -> usize {
    let limit = usize::try_from(value).unwrap_or(usize::MAX);
    if limit == 0 { fallback } else { limit }
}

fn settings_section(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    let obj = value.as_object()?;
    if let Some(section) = obj.get("expressionAutocompletion") {
        return settings_section(section);
    }
    Some(obj)
}
