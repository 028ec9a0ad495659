use url::Url;
use url::form_urlencoded;

use quiz_core::ShareToken;
use quiz_core::share::SHARE_QUERY_KEY;

/// Query parameter that requests a direct document load.
pub const DIRECT_URL_QUERY_KEY: &str = "url";

/// Launch parameters, read once from the query string the app was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupParams {
    pub direct_url: Option<String>,
    pub share_token: Option<ShareToken>,
}

impl StartupParams {
    /// Parse `url=` and `quiz=` from a query string, with or without the leading `?`.
    /// The first non-blank occurrence of each key wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.trim();
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                DIRECT_URL_QUERY_KEY if params.direct_url.is_none() => {
                    params.direct_url = Some(value.to_string());
                }
                SHARE_QUERY_KEY if params.share_token.is_none() => {
                    params.share_token = Some(ShareToken::from_raw(value));
                }
                _ => {}
            }
        }
        params
    }

    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.direct_url.is_none() && self.share_token.is_none()
    }
}
