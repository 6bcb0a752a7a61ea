//! API layer
//!
//! HTTP handlers for:
//! - Instagram data endpoints (media, dashboard, comments, replies)
//! - Metrics (Prometheus)

mod instagram;
pub mod metrics;

pub use instagram::{
    AccountQuery, DashboardResponse, MediaResponse, ReplyRequest, ReplyResponse,
    instagram_router,
};
pub use metrics::metrics_router;
