use url::Url;

use crate::server::error::{AppResult, Error};

/// where the embed controller is mounted, used when handing proxied urls back to the player
pub const EMBED_ROUTE: &str = "/api/v1/embed";

pub struct UrlUtil;

impl UrlUtil {
    /// the only validation the proxy does, anything absolute with a host goes through
    ///
    /// there is no allow list here on purpose, see DESIGN.md before adding one
    pub fn parse_target(raw: &str) -> AppResult<Url> {
        let url = Url::parse(raw.trim()).map_err(|_| Error::InvalidUrl)?;

        if !url.has_host() {
            return Err(Error::InvalidUrl);
        }

        Ok(url)
    }

    /// `/api/v1/embed?url=<percent encoded target>`
    pub fn proxied(target: &str) -> String {
        format!("{}?url={}", EMBED_ROUTE, urlencoding::encode(target))
    }
}
