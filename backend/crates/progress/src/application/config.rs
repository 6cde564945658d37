//! Application Configuration

/// Progress application configuration
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Default cut-off for the at-risk list (overall progress below it)
    pub at_risk_threshold: f64,
    /// Size of the dashboard's top-performer and needs-attention lists
    pub highlight_count: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            at_risk_threshold: 60.0,
            highlight_count: 5,
        }
    }
}

impl ProgressConfig {
    pub fn development() -> Self {
        Self::default()
    }
}
