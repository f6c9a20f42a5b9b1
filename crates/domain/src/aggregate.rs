//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

use crate::command::Command;

/// Trait for domain events.
///
/// Domain events are immutable facts, named in past tense. Each one knows
/// which aggregate it belongs to and its position in that aggregate's log.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name used when storing the event.
    fn event_type(&self) -> &'static str;

    /// Returns the aggregate this event belongs to.
    fn aggregate_id(&self) -> AggregateId;

    /// Returns the event's position in its aggregate's log (starting at 1).
    fn version(&self) -> Version;
}

/// Trait for event-sourced aggregates.
///
/// An aggregate is an immutable value. Its current state is derived by
/// folding its event log over [`apply`](Aggregate::apply), starting from an
/// empty instance, and new facts are decided by [`handle`](Aggregate::handle)
/// without touching the state.
pub trait Aggregate: Clone + Send + Sync + Sized {
    type Command: Command;

    type Event: DomainEvent;

    /// Business rule violations reported by [`handle`](Aggregate::handle).
    type Error: std::error::Error + Send + Sync;

    /// Data-integrity failures reported by [`apply`](Aggregate::apply) when a
    /// log cannot be replayed.
    type ReplayError: std::error::Error + Send + Sync;

    /// Returns the aggregate type name used for event store organization.
    fn aggregate_type() -> &'static str;

    fn id(&self) -> AggregateId;

    /// Returns the position of the last applied event (0 for none).
    fn version(&self) -> Version;

    /// Returns the state that results from applying `event` to `self`.
    ///
    /// Must be deterministic and free of side effects.
    fn apply(&self, event: &Self::Event) -> Result<Self, Self::ReplayError>;

    /// Decides the event a command produces against the current state, or
    /// rejects it.
    fn handle(&self, command: &Self::Command) -> Result<Self::Event, Self::Error>;

    /// Folds events left to right onto `self`.
    ///
    /// The events are trusted to be this aggregate's, in log order; they are
    /// neither filtered nor sorted.
    fn replay<'a, I>(self, events: I) -> Result<Self, Self::ReplayError>
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        events
            .into_iter()
            .try_fold(self, |state, event| state.apply(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TestEvent {
        Incremented { by: i64, pos: Version },
        Halved { pos: Version },
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Incremented { .. } => "Incremented",
                TestEvent::Halved { .. } => "Halved",
            }
        }

        fn aggregate_id(&self) -> AggregateId {
            counter_id()
        }

        fn version(&self) -> Version {
            match self {
                TestEvent::Incremented { pos, .. } | TestEvent::Halved { pos } => *pos,
            }
        }
    }

    #[derive(Debug, Clone)]
    struct Increment;

    impl Command for Increment {
        fn aggregate_id(&self) -> AggregateId {
            counter_id()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("odd value {0} cannot be halved")]
    struct OddValue(i64);

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i64,
        version: Version,
    }

    impl Aggregate for Counter {
        type Command = Increment;
        type Event = TestEvent;
        type Error = OddValue;
        type ReplayError = OddValue;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn id(&self) -> AggregateId {
            counter_id()
        }

        fn version(&self) -> Version {
            self.version
        }

        fn apply(&self, event: &Self::Event) -> Result<Self, Self::ReplayError> {
            match event {
                TestEvent::Incremented { by, pos } => Ok(Counter {
                    value: self.value + by,
                    version: *pos,
                }),
                TestEvent::Halved { pos } if self.value % 2 == 0 => Ok(Counter {
                    value: self.value / 2,
                    version: *pos,
                }),
                TestEvent::Halved { .. } => Err(OddValue(self.value)),
            }
        }

        fn handle(&self, _command: &Self::Command) -> Result<Self::Event, Self::Error> {
            let pos = self.version.next().ok_or(OddValue(self.value))?;
            Ok(TestEvent::Incremented { by: 1, pos })
        }
    }

    fn counter_id() -> AggregateId {
        AggregateId::from_uuid(Uuid::from_u128(1))
    }

    fn empty() -> Counter {
        Counter {
            value: 0,
            version: Version::initial(),
        }
    }

    #[test]
    fn replay_folds_in_order() {
        let events = vec![
            TestEvent::Incremented {
                by: 4,
                pos: Version::new(1),
            },
            TestEvent::Halved {
                pos: Version::new(2),
            },
            TestEvent::Incremented {
                by: 3,
                pos: Version::new(3),
            },
        ];

        let counter = empty().replay(&events).unwrap();
        assert_eq!(counter.value, 5);
        assert_eq!(counter.version, Version::new(3));
    }

    #[test]
    fn replay_of_nothing_is_the_starting_state() {
        let counter = empty().replay(&[]).unwrap();
        assert_eq!(counter, empty());
    }

    #[test]
    fn replay_stops_at_first_failure() {
        let events = vec![
            TestEvent::Incremented {
                by: 3,
                pos: Version::new(1),
            },
            TestEvent::Halved {
                pos: Version::new(2),
            },
        ];

        let err = empty().replay(&events).unwrap_err();
        assert_eq!(err.0, 3);
    }

    #[test]
    fn handle_does_not_change_state() {
        let counter = empty();
        let event = counter.handle(&Increment).unwrap();
        assert_eq!(event.version(), Version::first());
        assert_eq!(event.event_type(), "Incremented");
        assert_eq!(counter, empty());
    }
}
