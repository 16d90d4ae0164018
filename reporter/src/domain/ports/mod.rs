//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod agile;
pub mod clock;
pub mod notifier;
pub mod search;

pub use agile::{AgileClient, MAX_MOVE_BATCH};
pub use clock::Clock;
pub use notifier::Notifier;
pub use search::{IssueSearchClient, SearchPage, FIRST_PAGE};
