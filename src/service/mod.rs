//! Service layer
//!
//! Resolution, fetching and aggregation over Graph API data. Nothing here
//! persists anything beyond the short-lived reply ledger.

pub mod account;
pub mod dashboard;
pub mod instagram;
pub mod replies;

pub use account::{PageSelection, ResolveError, ResolvedAccount, resolve_account};
pub use dashboard::{DashboardStats, ProfileView, aggregate};
pub use replies::{PendingReply, ReplyLedger, reconcile};
