//! Global dashboard filters shared by every page of the retail dashboard.
//!
//! The canonical value is [`FilterState`]. It is resolved from three sources
//! (URL query, persisted blob, compiled defaults) and mirrored back to the
//! URL and to storage by the frontend store.

pub mod codec;
pub mod merge;
pub mod patch;
pub mod query;
pub mod relevance;
pub mod state;

pub use codec::*;
pub use merge::*;
pub use patch::*;
pub use query::*;
pub use relevance::*;
pub use state::*;
