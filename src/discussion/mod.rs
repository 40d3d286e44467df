//! Discussion queue - the shared, ordered list of topics driven by `dq`.

pub mod handler;
pub mod queue;

pub use handler::{QueueCommand, QueueInterceptor};
pub use queue::{Queue, QueueError, Topic};
