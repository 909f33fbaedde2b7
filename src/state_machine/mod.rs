// State machine module for workflow instance lifecycle management.
//
// The transition table is a pure function over (status, event) so guard
// failures are detected before any store mutation happens.

pub mod events;
pub mod lifecycle;
pub mod states;

// Re-export main types for convenient access
pub use events::LifecycleEvent;
pub use lifecycle::next_status;
pub use states::WorkflowStatus;
