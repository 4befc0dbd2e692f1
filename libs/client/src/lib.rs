//! Client-side comment state for one viewed recipe.
//!
//! The server broadcasts canonical comment events; a client that posted a
//! comment may have already rendered an optimistic placeholder for it. This
//! crate owns the merge: exactly one visible entry per comment, whether it
//! arrived over the wire first, locally first, or both.

pub mod feed;

pub use feed::{CommentFeed, FeedEntry, PendingComment};
