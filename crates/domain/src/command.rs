//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new event.
    pub aggregate: A,

    /// The event that was produced and persisted.
    pub event: A::Event,

    /// The aggregate's version after the command.
    pub new_version: Version,
}

/// Trait for commands that can be executed against an aggregate.
///
/// Commands are requests, not facts: they carry no position and may be
/// rejected by the aggregate's current state.
pub trait Command: Send + Sync {
    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;
}

/// How often a command is re-run after losing an append race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// A single attempt; conflicts are returned to the caller.
    pub fn no_retry() -> Self {
        Self::new(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Handler for executing commands against event-sourced aggregates.
///
/// For each command the handler:
/// 1. Reconstructs the aggregate from its stored log
/// 2. Lets the aggregate decide the resulting event (or reject the command)
/// 3. Appends the event, expecting the log to still end where it was read
/// 4. Applies the event to return the next state
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    retry: RetryPolicy,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
    DomainError: From<A::Error> + From<A::ReplayError>,
{
    /// Creates a handler with the default retry policy.
    pub fn new(store: S) -> Self {
        Self::with_retry_policy(store, RetryPolicy::default())
    }

    pub fn with_retry_policy(store: S, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            _phantom: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Reads and decodes an aggregate's stored events, in log order.
    pub async fn events(&self, aggregate_id: AggregateId) -> Result<Vec<A::Event>, DomainError> {
        let envelopes = self.store.get_events_for_aggregate(aggregate_id).await?;
        let events = envelopes
            .iter()
            .map(|envelope| envelope.decode::<A::Event>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// Reconstructs an aggregate by replaying its stored log onto `empty`.
    ///
    /// `empty` is the aggregate's state before its first event; its `id()`
    /// selects the log. A log that cannot be replayed is logged as corruption
    /// and returned as an error.
    pub async fn load(&self, empty: A) -> Result<A, DomainError> {
        let aggregate_id = empty.id();
        let events = self.events(aggregate_id).await?;

        empty.replay(&events).map_err(|err| {
            metrics::counter!("replay_failures_total", "aggregate" => A::aggregate_type())
                .increment(1);
            tracing::error!(
                aggregate_type = A::aggregate_type(),
                %aggregate_id,
                events = events.len(),
                error = %err,
                "event log is corrupted"
            );
            DomainError::from(err)
        })
    }

    /// Executes a command once.
    ///
    /// Fails with an [`EventStoreError::ConcurrencyConflict`](event_store::EventStoreError)
    /// if another writer appended to the aggregate between load and append.
    pub async fn execute(
        &self,
        empty: A,
        command: &A::Command,
    ) -> Result<CommandResult<A>, DomainError> {
        metrics::counter!("commands_total", "aggregate" => A::aggregate_type()).increment(1);

        let aggregate = self.load(empty).await?;
        let current_version = aggregate.version();

        let event = match aggregate.handle(command) {
            Ok(event) => event,
            Err(err) => {
                metrics::counter!("commands_rejected_total", "aggregate" => A::aggregate_type())
                    .increment(1);
                tracing::debug!(aggregate_id = %aggregate.id(), error = %err, "command rejected");
                return Err(err.into());
            }
        };

        let envelope = self.build_envelope(&event)?;
        let new_version = self
            .store
            .append(vec![envelope], AppendOptions::expect_version(current_version))
            .await?;

        let aggregate = aggregate.apply(&event)?;
        tracing::debug!(
            aggregate_id = %aggregate.id(),
            event_type = event.event_type(),
            version = %new_version,
            "command applied"
        );

        Ok(CommandResult {
            aggregate,
            event,
            new_version,
        })
    }

    /// Executes a command, reloading and re-running it when the append loses
    /// a race, up to the configured number of attempts.
    ///
    /// Rejections by the aggregate are never retried.
    pub async fn execute_with_retry(
        &self,
        empty: A,
        command: &A::Command,
    ) -> Result<CommandResult<A>, DomainError> {
        let mut attempt = 1;
        loop {
            match self.execute(empty.clone(), command).await {
                Err(err) if err.is_conflict() && attempt < self.retry.max_attempts => {
                    metrics::counter!(
                        "command_append_conflicts_total",
                        "aggregate" => A::aggregate_type()
                    )
                    .increment(1);
                    tracing::warn!(
                        aggregate_id = %command.aggregate_id(),
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %err,
                        "append conflict, retrying against fresh state"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn build_envelope(&self, event: &A::Event) -> Result<EventEnvelope, DomainError> {
        Ok(EventEnvelope::builder()
            .aggregate_id(event.aggregate_id())
            .aggregate_type(A::aggregate_type())
            .event_type(event.event_type())
            .version(event.version())
            .payload(event)?
            .build()?)
    }
}
