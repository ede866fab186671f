pub mod store;

pub use store::{SnapshotError, SnapshotStore};
