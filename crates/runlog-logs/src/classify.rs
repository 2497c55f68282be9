use runlog_types::{EventKind, LogLevel, LogRecord};

/// Derives a record's severity level
pub trait ClassifyLevel {
    fn classify(&self, record: &LogRecord) -> LogLevel;
}

/// Maps a raw event type to the name users type in `type:` queries
pub trait DisplayType {
    fn display_type(&self, event_type: &str) -> String;
}

/// Log messages keep their own level, everything else is an event
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultClassifier;

impl ClassifyLevel for DefaultClassifier {
    fn classify(&self, record: &LogRecord) -> LogLevel {
        match record.kind {
            EventKind::LogMessage => record.level.unwrap_or(LogLevel::Info),
            _ => LogLevel::Event,
        }
    }
}

/// Shortens the asset event types, passes the rest through
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDisplayTypes;

impl DisplayType for DefaultDisplayTypes {
    fn display_type(&self, event_type: &str) -> String {
        match event_type {
            "ASSET_MATERIALIZATION" => "MATERIALIZATION",
            "ASSET_OBSERVATION" => "OBSERVATION",
            "STEP_EXPECTATION_RESULT" => "EXPECTATION",
            "ASSET_CHECK_EVALUATION" => "CHECK_EVALUATION",
            other => other,
        }
        .to_string()
    }
}

impl<F> ClassifyLevel for F
where
    F: Fn(&LogRecord) -> LogLevel,
{
    fn classify(&self, record: &LogRecord) -> LogLevel {
        self(record)
    }
}
