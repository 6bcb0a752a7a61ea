//! Instagram (Facebook Login) OAuth authentication
//!
//! Handles:
//! - Authorization code flow against the Graph API
//! - Signed, expiring OAuth state (CSRF)
//! - One-time handoff of the access token to the browser
//! - The request-scoped Graph session extractor

mod handoff;
mod oauth;
mod session;
pub mod state;

pub use handoff::HandoffStore;
pub use oauth::{OAUTH_STATE_COOKIE, auth_router};
pub use session::{GraphSession, MaybeGraphSession};
pub use state::{OAuthState, issue_state, verify_state};
