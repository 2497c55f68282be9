use std::collections::HashSet;

use tracing::debug;

use runlog_types::{FilterSpec, LogRecord};

use crate::buffer::{BufferVersion, LogBuffer};
use crate::classify::{ClassifyLevel, DisplayType};
use crate::filter::FilterEngine;

/// Cache for filtered log results to avoid re-filtering on every render
#[derive(Debug, Default)]
pub struct FilterCache {
    /// Spec the cache was built with
    cached_spec: Option<FilterSpec>,
    /// Relevant step keys the cache was built with
    cached_step_keys: HashSet<String>,
    /// Buffer contents the cache was built from
    cached_version: BufferVersion,
    /// Visible records from the last pass
    pub visible: Vec<LogRecord>,
    /// Text matches from the last pass
    pub text_matched: Vec<LogRecord>,
}

impl FilterCache {
    /// Check if the cache is stale for the current state
    pub fn needs_refresh(
        &self,
        spec: &FilterSpec,
        relevant_step_keys: &HashSet<String>,
        version: BufferVersion,
    ) -> bool {
        match &self.cached_spec {
            None => true,
            Some(cached) => {
                cached != spec
                    || self.cached_step_keys != *relevant_step_keys
                    || self.cached_version != version
            }
        }
    }

    /// Re-filter the buffer unless the cached results still apply
    pub fn refresh<C, D>(
        &mut self,
        engine: &FilterEngine<C, D>,
        buffer: &LogBuffer,
        spec: &FilterSpec,
        relevant_step_keys: &HashSet<String>,
    ) -> bool
    where
        C: ClassifyLevel,
        D: DisplayType,
    {
        let version = buffer.version();
        if !self.needs_refresh(spec, relevant_step_keys, version) {
            debug!(records = version.len, "filter cache hit");
            return false;
        }

        let (version, records) = buffer.versioned_snapshot();
        let result = engine.filter(&records, spec, relevant_step_keys);
        self.cached_spec = Some(spec.clone());
        self.cached_step_keys = relevant_step_keys.clone();
        self.cached_version = version;
        self.visible = result.visible.into_iter().cloned().collect();
        self.text_matched = result.text_matched.into_iter().cloned().collect();
        true
    }

    /// Drop cached results
    pub fn invalidate(&mut self) {
        self.cached_spec = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlog_types::{LogLevel, QueryTerm};

    #[test]
    fn test_refresh_only_on_change() {
        let engine = FilterEngine::new();
        let steps = HashSet::new();
        let buffer = LogBuffer::new();
        buffer.push(LogRecord::message(LogLevel::Info, 1, "first"));
        let spec = FilterSpec::default();
        let mut cache = FilterCache::default();

        assert!(cache.refresh(&engine, &buffer, &spec, &steps));
        assert!(!cache.refresh(&engine, &buffer, &spec, &steps));

        buffer.push(LogRecord::message(LogLevel::Info, 2, "second"));
        assert!(cache.refresh(&engine, &buffer, &spec, &steps));
        assert_eq!(cache.visible.len(), 2);

        let spec = spec.with_query(vec![QueryTerm::text("second")]);
        assert!(cache.needs_refresh(&spec, &steps, buffer.version()));
        assert!(cache.refresh(&engine, &buffer, &spec, &steps));
        assert_eq!(cache.text_matched, vec![buffer.snapshot()[1].clone()]);
    }

    #[test]
    fn test_refill_after_clear_refreshes() {
        let engine = FilterEngine::new();
        let steps = HashSet::new();
        let spec = FilterSpec::default();
        let buffer = LogBuffer::new();
        let mut cache = FilterCache::default();

        buffer.push(LogRecord::message(LogLevel::Info, 1, "old run"));
        assert!(cache.refresh(&engine, &buffer, &spec, &steps));

        buffer.clear();
        buffer.push(LogRecord::message(LogLevel::Info, 1, "new run"));
        assert!(cache.refresh(&engine, &buffer, &spec, &steps));

        let messages: Vec<&str> = cache.visible.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["new run"]);
    }

    #[test]
    fn test_step_keys_and_invalidate() {
        let engine = FilterEngine::new();
        let buffer = LogBuffer::new();
        buffer.push(LogRecord::message(LogLevel::Info, 1, "x").with_step_key("A"));
        let spec = FilterSpec::default();
        let mut cache = FilterCache::default();
        cache.refresh(&engine, &buffer, &spec, &HashSet::new());

        let steps: HashSet<String> = ["A".to_string()].into();
        assert!(cache.needs_refresh(&spec, &steps, buffer.version()));

        cache.invalidate();
        assert!(cache.needs_refresh(&spec, &HashSet::new(), buffer.version()));
    }
}
