use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Version the caller expects the aggregate to be at before the append.
    /// If None, only the contiguity of the new events is checked.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no expected-version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects the aggregate's log to currently end at `version`.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Expects the aggregate to have no events yet.
    pub fn expect_new() -> Self {
        Self::expect_version(Version::initial())
    }
}

/// Append-only storage of aggregate event logs.
///
/// Implementations must make the version check and the write a single
/// atomic step: of two appends based on the same tail, exactly one succeeds
/// and the other fails with [`EventStoreError::ConcurrencyConflict`].
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to one aggregate's log.
    ///
    /// Either all events are stored or none are. Returns the aggregate's
    /// version after the append.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Retrieves all events for an aggregate, ordered by version.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Retrieves an aggregate's events with version `>= from_version`,
    /// ordered by version.
    async fn get_events_for_aggregate_from_version(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>>;

    /// Returns the aggregate's current version, or None if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;
}

/// Convenience methods available on every [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    async fn append_event(&self, event: EventEnvelope, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    /// Checks if an aggregate has any events.
    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks that a batch targets a single aggregate with contiguous versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "cannot append empty event list".to_string(),
        ));
    };

    if first.version < Version::first() {
        return Err(EventStoreError::InvalidAppend(format!(
            "event versions start at {}, got {}",
            Version::first(),
            first.version
        )));
    }

    let mut expected_version = first.version;
    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidAppend(
                "all events must be for the same aggregate".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidAppend(
                "all events must have the same aggregate type".to_string(),
            ));
        }
        expected_version = expected_version.next().ok_or_else(|| {
            EventStoreError::InvalidAppend("event versions overflow".to_string())
        })?;
        if event.version != expected_version {
            return Err(EventStoreError::InvalidAppend(format!(
                "event versions must be sequential: expected {expected_version}, got {}",
                event.version
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn envelope(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("ShoppingCart")
            .event_type("ItemAdded")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({}))
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_empty_batch() {
        assert!(matches!(
            validate_events_for_append(&[]),
            Err(EventStoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn rejects_mixed_aggregates() {
        let a = AggregateId::from_uuid(Uuid::from_u128(1));
        let b = AggregateId::from_uuid(Uuid::from_u128(2));
        let result = validate_events_for_append(&[envelope(a, 1), envelope(b, 2)]);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_version_gaps() {
        let id = AggregateId::from_uuid(Uuid::from_u128(1));
        let result = validate_events_for_append(&[envelope(id, 1), envelope(id, 3)]);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_versions_below_first() {
        let id = AggregateId::from_uuid(Uuid::from_u128(1));
        for version in [0, -1, i64::MIN] {
            let result = validate_events_for_append(&[envelope(id, version)]);
            assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
        }
    }

    #[test]
    fn rejects_batch_running_past_max_version() {
        let id = AggregateId::from_uuid(Uuid::from_u128(1));
        let batch = [envelope(id, i64::MAX), envelope(id, i64::MAX)];
        let result = validate_events_for_append(&batch);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn accepts_contiguous_batch() {
        let id = AggregateId::from_uuid(Uuid::from_u128(1));
        let batch = [envelope(id, 4), envelope(id, 5), envelope(id, 6)];
        assert!(validate_events_for_append(&batch).is_ok());
    }

    #[test]
    fn append_options_constructors() {
        assert_eq!(AppendOptions::new().expected_version, None);
        assert_eq!(
            AppendOptions::expect_new().expected_version,
            Some(Version::initial())
        );
        assert_eq!(
            AppendOptions::expect_version(Version::new(3)).expected_version,
            Some(Version::new(3))
        );
    }
}
