//! Unconfirmed reply ledger
//!
//! A reply created here is not re-fetched. It is remembered as unconfirmed
//! until a later comments fetch shows it upstream, or until it expires.
//! Entries belong to the session that created them and are only shown
//! back to it. Uses Moka for the TTL-bound in-memory store.

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::graph::CommentList;

/// How long an unconfirmed reply is remembered
pub const PENDING_REPLY_TTL: Duration = Duration::from_secs(3600);

const PENDING_REPLY_CAPACITY: u64 = 1_000;

/// Reply accepted upstream but not yet seen in a comments fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReply {
    pub id: String,
    pub comment_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub confirmed: bool,
}

impl PendingReply {
    /// Build from the provider's create response (`{"id": ...}`)
    pub fn from_created(created: &serde_json::Value, comment_id: &str, text: &str) -> Option<Self> {
        let id = created.get("id")?.as_str()?;
        Some(Self {
            id: id.to_string(),
            comment_id: comment_id.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            confirmed: false,
        })
    }
}

/// Outcome of comparing pending replies with a fetched thread
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Ids now visible upstream
    pub confirmed: Vec<String>,
    /// Still missing upstream, in the order given
    pub outstanding: Vec<PendingReply>,
}

/// Split `pending` into confirmed and outstanding against `comments`
///
/// Replies whose parent comment is not in `comments` are neither: the thread
/// fetched does not say anything about them.
pub fn reconcile(comments: &CommentList, pending: Vec<PendingReply>) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    for reply in pending {
        let Some(comment) = comments.data.iter().find(|c| c.id == reply.comment_id) else {
            continue;
        };

        if comment.reply_ids().any(|id| id == reply.id) {
            outcome.confirmed.push(reply.id);
        } else {
            outcome.outstanding.push(reply);
        }
    }

    outcome
}

#[derive(Clone)]
struct LedgerEntry {
    owner: String,
    reply: PendingReply,
}

/// In-memory ledger of unconfirmed replies, keyed by reply id
///
/// `owner` is an opaque session key, never the access token itself.
pub struct ReplyLedger {
    entries: Cache<String, LedgerEntry>,
}

impl ReplyLedger {
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(PENDING_REPLY_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self { entries }
    }

    pub async fn record(&self, owner: &str, reply: PendingReply) {
        let entry = LedgerEntry {
            owner: owner.to_string(),
            reply,
        };
        self.entries.insert(entry.reply.id.clone(), entry).await;
    }

    /// Reconcile against a fetched comments payload
    ///
    /// Only `owner`'s replies are considered. Confirmed ones are dropped from
    /// the ledger. Returns the replies of this thread that are still
    /// unconfirmed, oldest first.
    pub async fn reconcile_thread(
        &self,
        owner: &str,
        payload: &serde_json::Value,
    ) -> Vec<PendingReply> {
        let comments: CommentList = serde_json::from_value(payload.clone()).unwrap_or_default();
        let thread: HashSet<&str> = comments.data.iter().map(|c| c.id.as_str()).collect();

        let mut candidates: Vec<PendingReply> = self
            .entries
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.reply)
            .filter(|reply| thread.contains(reply.comment_id.as_str()))
            .collect();
        candidates.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        let outcome = reconcile(&comments, candidates);
        for id in &outcome.confirmed {
            self.entries.invalidate(id).await;
        }
        if !outcome.confirmed.is_empty() {
            tracing::debug!(count = outcome.confirmed.len(), "Pending replies confirmed");
        }

        outcome.outstanding
    }

    pub async fn contains(&self, reply_id: &str) -> bool {
        self.entries.get(reply_id).await.is_some()
    }
}

impl Default for ReplyLedger {
    fn default() -> Self {
        Self::new(PENDING_REPLY_TTL)
    }
}
