mod store;

pub use store::{SharedState, TrackerState};
