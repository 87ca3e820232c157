pub mod sentence;
pub mod snapshot;

pub use sentence::*;
pub use snapshot::*;
