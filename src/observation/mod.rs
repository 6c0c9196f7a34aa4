pub mod chronicle;
pub mod events;

pub use chronicle::Chronicle;
pub use events::{Event, EventType};
