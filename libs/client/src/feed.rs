//! Reconciliation of broadcast events against optimistic local state.

use chrono::{DateTime, Utc};
use ladle_common::id::{prefix, prefixed_ulid};
use ladle_common::{Comment, ServerMessage};

/// How far apart an optimistic entry's submit time and the canonical
/// comment's creation time may be and still be treated as the same comment.
const MATCH_WINDOW_SECS: i64 = 60;

/// A locally-originated comment still waiting for its broadcast round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComment {
    /// Client-generated temporary id (`tmp_` prefixed). Never leaves the
    /// client; the canonical id replaces it on reconciliation.
    pub local_id: String,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
}

/// One visible row in the comment list.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEntry {
    /// Optimistic placeholder, not yet confirmed by the server.
    Pending(PendingComment),
    /// Canonical comment as persisted by the server.
    Confirmed(Comment),
}

impl FeedEntry {
    pub fn body(&self) -> &str {
        match self {
            FeedEntry::Pending(pending) => &pending.body,
            FeedEntry::Confirmed(comment) => &comment.body,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FeedEntry::Pending(_))
    }
}

/// Ordered local comment list for one viewed recipe.
///
/// Merging is idempotent and keyed by comment id, so duplicate delivery of
/// the same event leaves exactly one visible entry. Events for ids the feed
/// has never seen (updates or deletes after a leave/rejoin lost history) are
/// no-ops; there is no replay guarantee to lean on.
#[derive(Debug)]
pub struct CommentFeed {
    room_id: String,
    /// Local authenticated user, if any. Needed to claim pending entries.
    principal_id: Option<String>,
    entries: Vec<FeedEntry>,
    /// Highest room sequence number seen this session. Detection only; a
    /// stale event is logged, never buffered or reordered.
    last_seq: u64,
}

impl CommentFeed {
    pub fn new(room_id: impl Into<String>, principal_id: Option<String>) -> Self {
        Self {
            room_id: room_id.into(),
            principal_id,
            entries: Vec::new(),
            last_seq: 0,
        }
    }

    /// Seed the feed from REST history (oldest first). Pending entries
    /// survive a reload; confirmed state is replaced wholesale.
    pub fn load(&mut self, comments: Vec<Comment>) {
        let pending: Vec<FeedEntry> = self
            .entries
            .drain(..)
            .filter(FeedEntry::is_pending)
            .collect();
        self.entries = comments.into_iter().map(FeedEntry::Confirmed).collect();
        self.entries.extend(pending);
    }

    /// Insert an optimistic entry for a comment this client just submitted.
    /// Returns the temporary id, or `None` when nobody is logged in.
    pub fn submit(&mut self, body: &str) -> Option<String> {
        self.principal_id.as_ref()?;

        let local_id = prefixed_ulid(prefix::LOCAL);
        self.entries.push(FeedEntry::Pending(PendingComment {
            local_id: local_id.clone(),
            body: body.trim().to_string(),
            submitted_at: Utc::now(),
        }));
        Some(local_id)
    }

    /// Merge one server event into local state.
    pub fn apply(&mut self, msg: &ServerMessage) {
        if let Some(room_id) = msg.room_id() {
            if room_id != self.room_id {
                return;
            }
        }
        if let Some(seq) = msg.seq() {
            if seq <= self.last_seq {
                tracing::debug!(
                    room_id = %self.room_id,
                    seq,
                    last_seq = self.last_seq,
                    "stale or duplicate event"
                );
            } else {
                self.last_seq = seq;
            }
        }

        match msg {
            ServerMessage::Created { comment, .. } => self.merge_created(comment),
            ServerMessage::Updated { comment, .. } => {
                if !self.replace_confirmed(comment) {
                    tracing::debug!(comment_id = %comment.id, "update for unknown comment");
                }
            }
            ServerMessage::Deleted { comment_id, .. } => {
                self.entries.retain(|entry| match entry {
                    FeedEntry::Confirmed(comment) => comment.id != *comment_id,
                    FeedEntry::Pending(_) => true,
                });
            }
            // Errors carry no state; the UI layer surfaces them.
            ServerMessage::AuthError { .. } | ServerMessage::Error { .. } => {}
        }
    }

    /// The visible comment list, in arrival order.
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merge_created(&mut self, comment: &Comment) {
        // Idempotent by id.
        if self.entries.iter().any(|entry| match entry {
            FeedEntry::Confirmed(existing) => existing.id == comment.id,
            FeedEntry::Pending(_) => false,
        }) {
            return;
        }

        // Our own comment coming back: swap the placeholder in place so the
        // row doesn't jump.
        if self.principal_id.as_deref() == Some(comment.author_id.as_str()) {
            if let Some(slot) = self.entries.iter_mut().find(|entry| match entry {
                FeedEntry::Pending(pending) => {
                    pending.body == comment.body
                        && (comment.created_at - pending.submitted_at)
                            .num_seconds()
                            .abs()
                            <= MATCH_WINDOW_SECS
                }
                FeedEntry::Confirmed(_) => false,
            }) {
                *slot = FeedEntry::Confirmed(comment.clone());
                return;
            }
        }

        self.entries.push(FeedEntry::Confirmed(comment.clone()));
    }

    fn replace_confirmed(&mut self, comment: &Comment) -> bool {
        for entry in &mut self.entries {
            if let FeedEntry::Confirmed(existing) = entry {
                if existing.id == comment.id {
                    *existing = comment.clone();
                    return true;
                }
            }
        }
        false
    }
}
