//! Fixtures shared by unit tests
mod entry_builder;
mod fixtures;
mod mock;

pub use entry_builder::*;
pub use fixtures::*;
pub use mock::*;
