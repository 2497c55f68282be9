use std::collections::HashSet;

use tracing::debug;

use runlog_types::{FilterSpec, LogRecord, QueryTerm, QueryToken};

use crate::classify::{ClassifyLevel, DefaultClassifier, DefaultDisplayTypes, DisplayType};

/// Result of one filter pass, borrowing from the input batch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredLogs<'a> {
    /// Records to show in the log pane
    pub visible: Vec<&'a LogRecord>,

    /// Records satisfying every query term (empty when no query is active)
    pub text_matched: Vec<&'a LogRecord>,
}

impl<'a> FilteredLogs<'a> {
    /// Visible records paired with whether each is a text match
    ///
    /// `text_matched` is an in-order sub-sequence of `visible`, so a single
    /// cursor into it is enough.
    pub fn marked(&self) -> impl Iterator<Item = (&'a LogRecord, bool)> + '_ {
        let mut next_match = 0;
        self.visible.iter().map(move |record| {
            let is_match = self
                .text_matched
                .get(next_match)
                .is_some_and(|m| std::ptr::eq(*m, *record));
            if is_match {
                next_match += 1;
            }
            (*record, is_match)
        })
    }
}

/// Log filter with injectable level classification and type display
#[derive(Clone, Debug, Default)]
pub struct FilterEngine<C = DefaultClassifier, D = DefaultDisplayTypes> {
    classifier: C,
    display: D,
}

impl FilterEngine {
    /// Create an engine with the default collaborators
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, D> FilterEngine<C, D>
where
    C: ClassifyLevel,
    D: DisplayType,
{
    pub fn with_collaborators(classifier: C, display: D) -> Self {
        Self {
            classifier,
            display,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Filter `records` for display
    ///
    /// Planning records are always dropped. The rest must pass the level and
    /// time gates; when a query is active, text matches are the survivors for
    /// which every term holds. Output order follows input order.
    pub fn filter<'a>(
        &self,
        records: &'a [LogRecord],
        spec: &FilterSpec,
        relevant_step_keys: &HashSet<String>,
    ) -> FilteredLogs<'a> {
        let surviving: Vec<&LogRecord> = records
            .iter()
            .filter(|r| self.passes_level_and_time(r, spec))
            .collect();

        if !spec.has_text_query() {
            debug!(
                total = records.len(),
                visible = surviving.len(),
                "filtered run logs without query"
            );
            return FilteredLogs {
                visible: surviving,
                text_matched: Vec::new(),
            };
        }

        let text_matched: Vec<&LogRecord> = surviving
            .iter()
            .copied()
            .filter(|r| self.matches_query(r, &spec.log_query, relevant_step_keys))
            .collect();

        debug!(
            total = records.len(),
            surviving = surviving.len(),
            matched = text_matched.len(),
            hide_non_matches = spec.hide_non_matches,
            "filtered run logs"
        );

        let visible = if spec.hide_non_matches {
            text_matched.clone()
        } else {
            surviving
        };

        FilteredLogs {
            visible,
            text_matched,
        }
    }

    fn passes_level_and_time(&self, record: &LogRecord, spec: &FilterSpec) -> bool {
        if record.kind.is_planning() {
            return false;
        }

        if !spec.level_enabled(self.classifier.classify(record)) {
            return false;
        }

        match spec.since_time {
            Some(since) => record.timestamp >= since,
            None => true,
        }
    }

    /// Every term must hold
    pub fn matches_query(
        &self,
        record: &LogRecord,
        terms: &[QueryTerm],
        relevant_step_keys: &HashSet<String>,
    ) -> bool {
        terms
            .iter()
            .all(|term| self.matches_term(record, term, relevant_step_keys))
    }

    pub fn matches_term(
        &self,
        record: &LogRecord,
        term: &QueryTerm,
        relevant_step_keys: &HashSet<String>,
    ) -> bool {
        match term.token {
            QueryToken::Scope => record
                .step_key
                .as_ref()
                .is_some_and(|key| relevant_step_keys.contains(key)),
            QueryToken::Step => record
                .step_key
                .as_deref()
                .is_some_and(|key| key == term.value),
            QueryToken::Type => record
                .event_type
                .as_deref()
                .is_some_and(|t| self.display.display_type(t) == term.value),
            QueryToken::Text => record
                .message
                .to_lowercase()
                .contains(&term.value.to_lowercase()),
        }
    }
}

/// Filter with the default classifier and display types
pub fn filter_logs<'a>(
    records: &'a [LogRecord],
    spec: &FilterSpec,
    relevant_step_keys: &HashSet<String>,
) -> FilteredLogs<'a> {
    FilterEngine::new().filter(records, spec, relevant_step_keys)
}
