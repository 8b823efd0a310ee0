mod keys;
mod queue;

pub use keys::{Controls, InputSnapshot, KeyBindings, key};
pub use queue::{DEFAULT_INPUT_QUEUE_CAPACITY, InputQueue};
