//! Deterministic state machines driven by commands and events.

/// A state machine split into decision and evolution.
///
/// - **Decision**: `handle(&self, cmd)` validates a command against the
///   current state and returns the events it produces.
/// - **Evolution**: `apply(&mut self, event)` moves the state forward.
///
/// Neither half performs IO. Callers persist or publish the returned events
/// and then apply them.
pub trait StateMachine {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events a command produces. Must not mutate state.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Handle a command and apply every resulting event.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
