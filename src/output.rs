use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};

use runlog_logs::{ClassifyLevel, FilteredLogs, LevelCounts, LogLevel, LogRecord, MatchHighlighter};

const HIGHLIGHT_START: &str = "\x1b[1;33m";
const HIGHLIGHT_END: &str = "\x1b[0m";

/// Formatting options for printed records
pub struct Printer<'a, C> {
    pub classifier: &'a C,
    pub highlighter: &'a MatchHighlighter,
    pub local_time: bool,
    pub highlight: bool,
    /// Prefix text matches with `*` (when non-matches are shown too)
    pub mark_matches: bool,
}

impl<C: ClassifyLevel> Printer<'_, C> {
    pub fn print_logs<W: Write>(&self, out: &mut W, logs: &FilteredLogs<'_>) -> io::Result<()> {
        for (record, is_match) in logs.marked() {
            let marker = match (self.mark_matches, is_match) {
                (false, _) => "",
                (true, true) => "* ",
                (true, false) => "  ",
            };
            writeln!(
                out,
                "{}{} {:<8} {:<24} {}",
                marker,
                self.format_time(record.timestamp),
                self.classifier.classify(record).as_str(),
                record.step_key.as_deref().unwrap_or("-"),
                self.format_message(record)
            )?;
        }
        Ok(())
    }

    fn format_time(&self, millis: i64) -> String {
        let Some(time) = DateTime::<Utc>::from_timestamp_millis(millis) else {
            return millis.to_string();
        };
        if self.local_time {
            time.with_timezone(&Local).format("%H:%M:%S%.3f").to_string()
        } else {
            time.format("%H:%M:%S%.3f").to_string()
        }
    }

    fn format_message(&self, record: &LogRecord) -> String {
        if !self.highlight {
            return record.message.clone();
        }

        let message = &record.message;
        let mut rendered = String::with_capacity(message.len());
        let mut last = 0;
        for (start, end) in self.highlighter.find_matches(message) {
            rendered.push_str(&message[last..start]);
            rendered.push_str(HIGHLIGHT_START);
            rendered.push_str(&message[start..end]);
            rendered.push_str(HIGHLIGHT_END);
            last = end;
        }
        rendered.push_str(&message[last..]);
        rendered
    }
}

/// One `LEVEL count` line per level, then the total
pub fn print_counts<W: Write>(out: &mut W, counts: &LevelCounts) -> io::Result<()> {
    for level in LogLevel::ALL {
        writeln!(out, "{:<8} {}", level.as_str(), counts.get(level))?;
    }
    writeln!(out, "{:<8} {}", "TOTAL", counts.total())
}
