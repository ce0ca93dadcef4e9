//! Emulation wrapper configuration.

use serde::{Deserialize, Serialize};

/// Options shared by the emulation wrappers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulationConfig {
    /// Check the first observation and first action against their flat
    /// spaces
    pub check_spaces: bool,
    /// Treat truncation as the end of a single-agent episode. Off by
    /// default: only termination ends it
    pub done_on_truncation: bool,
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            check_spaces: true,
            done_on_truncation: false,
        }
    }
}

impl EmulationConfig {
    pub fn with_space_checks(mut self, enabled: bool) -> Self {
        self.check_spaces = enabled;
        self
    }

    pub fn with_done_on_truncation(mut self, enabled: bool) -> Self {
        self.done_on_truncation = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EmulationConfig = serde_json::from_str(r#"{"check_spaces": false}"#).unwrap();
        assert!(!config.check_spaces);
        assert!(!config.done_on_truncation);

        let json = serde_json::to_string(&EmulationConfig::default().with_done_on_truncation(true))
            .unwrap();
        let back: EmulationConfig = serde_json::from_str(&json).unwrap();
        assert!(back.done_on_truncation);
        assert!(back.check_spaces);
    }
}
