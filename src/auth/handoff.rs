//! One-time login handoff
//!
//! After the code exchange the browser is redirected with a short-lived
//! single-use code instead of the bearer token. The frontend redeems it with
//! a same-origin POST.

use moka::future::Cache;
use std::time::{Duration, Instant};

use super::state::random_token;

const HANDOFF_CAPACITY: u64 = 1_000;

/// Access tokens waiting to be picked up, keyed by handoff code
pub struct HandoffStore {
    codes: Cache<String, (String, Instant)>,
    ttl: Duration,
}

impl HandoffStore {
    pub fn new(ttl: Duration) -> Self {
        let codes = Cache::builder()
            .max_capacity(HANDOFF_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self { codes, ttl }
    }

    /// Store `access_token` and return the code that redeems it
    pub async fn issue(&self, access_token: String) -> String {
        let code = random_token(32);
        let expires_at = Instant::now() + self.ttl;
        self.codes.insert(code.clone(), (access_token, expires_at)).await;
        code
    }

    /// Take the token for `code`; a second redeem of the same code fails
    pub async fn redeem(&self, code: &str) -> Option<String> {
        let (access_token, expires_at) = self.codes.remove(code).await?;
        (Instant::now() < expires_at).then_some(access_token)
    }
}
