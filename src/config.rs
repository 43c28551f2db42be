use std::time::Duration;

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KaizenConfig {
    /// Quiet time without mutations before the thread counts as settled.
    pub quiet_interval: Duration,
    /// Popup lifetime after the pointer leaves the trigger element.
    pub trigger_grace: Duration,
    /// Popup lifetime when the trigger was already detached (a mention
    /// inside a popup clone, which never reports a leave).
    pub detached_grace: Duration,
    /// Popup lifetime after the pointer leaves the popup.
    pub popup_grace: Duration,
}

impl Default for KaizenConfig {
    fn default() -> Self {
        Self {
            quiet_interval: Duration::from_millis(1000),
            trigger_grace: Duration::from_millis(500),
            detached_grace: Duration::from_millis(3000),
            popup_grace: Duration::from_millis(500),
        }
    }
}

impl KaizenConfig {
    pub fn with_quiet_interval(mut self, interval: Duration) -> Self {
        self.quiet_interval = interval;
        self
    }

    pub fn with_trigger_grace(mut self, grace: Duration) -> Self {
        self.trigger_grace = grace;
        self
    }

    pub fn with_detached_grace(mut self, grace: Duration) -> Self {
        self.detached_grace = grace;
        self
    }

    pub fn with_popup_grace(mut self, grace: Duration) -> Self {
        self.popup_grace = grace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_host_timings() {
        let config = KaizenConfig::default();
        assert_eq!(config.quiet_interval, Duration::from_millis(1000));
        assert_eq!(config.trigger_grace, Duration::from_millis(500));
        assert_eq!(config.detached_grace, Duration::from_secs(3));
        assert_eq!(config.popup_grace, Duration::from_millis(500));
    }

    #[test]
    fn builders_override_single_fields() {
        let config = KaizenConfig::default().with_quiet_interval(Duration::from_millis(250));
        assert_eq!(config.quiet_interval, Duration::from_millis(250));
        assert_eq!(config.popup_grace, KaizenConfig::default().popup_grace);
    }
}
