//! Account resolution pipeline
//!
//! Walks user token -> Page -> Instagram business account. Each step depends
//! on the previous one, so the calls are strictly sequential.

use thiserror::Error;

use crate::graph::{self, GraphApi, GraphError, PageAccountLink, PageList};

/// Which managed Page the dashboard reads from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// First Page in the provider's listing order
    #[default]
    First,
    /// Page with this id; absent from the listing means `NoPageFound`
    Id(String),
}

impl PageSelection {
    /// Blank ids fall back to the first Page
    pub fn from_query(page_id: Option<&str>) -> Self {
        match page_id.map(str::trim) {
            Some(id) if !id.is_empty() => PageSelection::Id(id.to_string()),
            _ => PageSelection::First,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no Facebook Page is managed by this token")]
    NoPageFound,

    #[error("Page has no linked Instagram business account")]
    NoLinkedAccount,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Output of the pipeline
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    pub page_id: String,
    pub ig_user_id: String,
    /// Required for comment reads
    pub page_access_token: String,
}

impl std::fmt::Debug for ResolvedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedAccount")
            .field("page_id", &self.page_id)
            .field("ig_user_id", &self.ig_user_id)
            .field("page_access_token", &"<redacted>")
            .finish()
    }
}

/// Resolve the Instagram business account behind a user token
///
/// # Steps
/// 1. List Pages owned by the token holder (`me/accounts`)
/// 2. Pick one according to `selection`
/// 3. Read its `instagram_business_account` using the Page token
///
/// # Errors
/// `NoPageFound` stops before step 3; `NoLinkedAccount` when the Page has
/// no business account; `Graph` for any upstream failure.
pub async fn resolve_account(
    graph: &dyn GraphApi,
    user_token: &str,
    selection: &PageSelection,
) -> Result<ResolvedAccount, ResolveError> {
    let pages: PageList = graph::get_as(graph, "me/accounts", &[("access_token", user_token)]).await?;

    let page = match selection {
        PageSelection::First => pages.data.into_iter().next(),
        PageSelection::Id(id) => pages.data.into_iter().find(|page| &page.id == id),
    }
    .ok_or(ResolveError::NoPageFound)?;

    let link: PageAccountLink = graph::get_as(
        graph,
        &graph::node_path(&page.id, None),
        &[
            ("fields", "instagram_business_account"),
            ("access_token", page.access_token.as_str()),
        ],
    )
    .await?;

    let account = link
        .instagram_business_account
        .ok_or(ResolveError::NoLinkedAccount)?;

    tracing::debug!(
        page_id = %page.id,
        ig_user_id = %account.id,
        "Resolved Instagram business account"
    );

    Ok(ResolvedAccount {
        page_id: page.id,
        ig_user_id: account.id,
        page_access_token: page.access_token,
    })
}
