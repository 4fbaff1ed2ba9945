use chrono::TimeDelta;

/// Immutable configuration for one snapshot log.
///
/// The three age thresholds form retention tiers: everything newer than
/// `preserve_all_within` is kept in full, older snapshots thin to one per
/// hour until `preserve_hourly_within`, then to one per day until
/// `preserve_daily_within`, beyond which they are dropped. The getters
/// enforce the non-decreasing tier order, so a configuration that sets the
/// windows out of order is repaired silently instead of erroring.
#[derive(Debug, Clone)]
pub struct SnapshotLogSettings {
    name: String,
    file_extension: String,
    min_keep_count: usize,
    preserve_all_within: TimeDelta,
    preserve_hourly_within: TimeDelta,
    preserve_daily_within: TimeDelta,
}

impl SnapshotLogSettings {
    /// Settings for the log with the given name, with a `.json` extension,
    /// a floor of one snapshot, and all retention windows at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_extension: ".json".to_string(),
            min_keep_count: 1,
            preserve_all_within: TimeDelta::zero(),
            preserve_hourly_within: TimeDelta::zero(),
            preserve_daily_within: TimeDelta::zero(),
        }
    }

    /// File extension used by file-backed stores, normalized to start
    /// with a dot.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.file_extension = if extension.starts_with('.') {
            extension
        } else {
            format!(".{extension}")
        };
        self
    }

    /// Number of newest snapshots always exempt from deletion. Values
    /// below 1 clamp to 1.
    pub fn with_min_keep_count(mut self, count: usize) -> Self {
        self.min_keep_count = count;
        self
    }

    /// Window within which every snapshot is preserved. Negative values
    /// clamp to zero.
    pub fn with_preserve_all_within(mut self, window: TimeDelta) -> Self {
        self.preserve_all_within = window.max(TimeDelta::zero());
        self
    }

    /// Window within which at most one snapshot per hour is preserved.
    /// Negative values clamp to zero.
    pub fn with_preserve_hourly_within(mut self, window: TimeDelta) -> Self {
        self.preserve_hourly_within = window.max(TimeDelta::zero());
        self
    }

    /// Window within which at most one snapshot per day is preserved.
    /// Negative values clamp to zero.
    pub fn with_preserve_daily_within(mut self, window: TimeDelta) -> Self {
        self.preserve_daily_within = window.max(TimeDelta::zero());
        self
    }

    /// Log name, used as the identifier prefix and namespace key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized file extension, including the leading dot.
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Floor count, never below 1.
    pub fn min_keep_count(&self) -> usize {
        self.min_keep_count.max(1)
    }

    pub fn preserve_all_within(&self) -> TimeDelta {
        self.preserve_all_within
    }

    /// Never smaller than the preserve-all window.
    pub fn preserve_hourly_within(&self) -> TimeDelta {
        self.preserve_hourly_within.max(self.preserve_all_within())
    }

    /// Never smaller than either of the inner windows.
    pub fn preserve_daily_within(&self) -> TimeDelta {
        self.preserve_daily_within.max(self.preserve_hourly_within())
    }
}
