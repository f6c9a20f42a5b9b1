use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// In-memory event store.
///
/// Keeps one append-only log per aggregate. Cloning is cheap and clones share
/// the same logs, so a clone can be handed to each concurrent writer.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    logs: Arc<RwLock<HashMap<AggregateId, Vec<EventEnvelope>>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored across all aggregates.
    pub async fn event_count(&self) -> usize {
        self.logs.read().await.values().map(Vec::len).sum()
    }

    /// Returns the number of aggregates with at least one stored event.
    pub async fn aggregate_count(&self) -> usize {
        self.logs.read().await.len()
    }

    /// Drops every stored log.
    pub async fn clear(&self) {
        self.logs.write().await.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let first_new_version = events[0].version;

        // Check and write under one lock so racing appends serialize here.
        let mut logs = self.logs.write().await;
        let current_version = logs
            .get(&aggregate_id)
            .and_then(|log| log.last())
            .map(|e| e.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            metrics::counter!("event_store_concurrency_conflicts_total").increment(1);
            tracing::debug!(%aggregate_id, %expected, actual = %current_version, "stale expected version");
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Position already taken.
        if first_new_version <= current_version {
            metrics::counter!("event_store_concurrency_conflicts_total").increment(1);
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: Version::new(first_new_version.as_i64().saturating_sub(1)),
                actual: current_version,
            });
        }

        if current_version.next() != Some(first_new_version) {
            return Err(EventStoreError::InvalidAppend(format!(
                "aggregate {aggregate_id} is at version {current_version}, cannot append version {first_new_version}"
            )));
        }

        let appended = events.len() as u64;
        let last_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(current_version);
        logs.entry(aggregate_id).or_default().extend(events);

        metrics::counter!("event_store_appends_total").increment(appended);
        tracing::trace!(%aggregate_id, version = %last_version, appended, "events appended");

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let logs = self.logs.read().await;
        Ok(logs.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn get_events_for_aggregate_from_version(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(&aggregate_id)
            .map(|log| {
                log.iter()
                    .filter(|e| e.version >= from_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(&aggregate_id)
            .and_then(|log| log.last())
            .map(|e| e.version))
    }
}
