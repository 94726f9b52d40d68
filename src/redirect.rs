use url::Url;

use crate::error::Error;
use crate::types::SessionCode;

/// Fragment key carrying the one-time code on the way back from the provider.
pub const SESSION_ID_PARAM: &str = "session_id";

/// Query parameter the provider reads the return URL from.
pub const REDIRECT_PARAM: &str = "redirect";

/// Build the callback URL the identity provider sends the browser back to.
///
/// The scheme is forced to `https` and a leading `www.` label is dropped, so
/// every entry point of the site lands on the same allowlisted origin.
///
/// # Errors
///
/// Returns [`Error::Config`] if `location` has no host, or [`Error::Url`] if
/// the normalized host does not form a valid URL.
pub fn return_url(location: &Url, callback_path: &str) -> Result<Url, Error> {
    let host = location
        .host_str()
        .ok_or_else(|| Error::Config(format!("page location has no host: {location}")))?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let mut url = Url::parse(&format!("https://{host}"))?;
    url.set_port(location.port())
        .map_err(|()| Error::Config(format!("cannot carry port over from {location}")))?;
    url.set_path(callback_path);
    Ok(url)
}

/// Identity-provider entry URL carrying `return_url` as its redirect target.
#[must_use]
pub fn login_url(provider: &Url, return_url: &Url) -> Url {
    let mut url = provider.clone();
    url.query_pairs_mut()
        .append_pair(REDIRECT_PARAM, return_url.as_str());
    url
}

/// Extract the one-time `session_id` from a callback URL fragment.
///
/// Accepts the fragment with or without its leading `#`. Returns `None` when
/// the key is missing or empty.
#[must_use]
pub fn extract_session_id(fragment: &str) -> Option<SessionCode> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == SESSION_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(SessionCode)
}
