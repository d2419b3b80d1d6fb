//! Manual redirect following.

use url::Url;

use super::{HttpResponse, HttpTransport};
use crate::error::{FetchError, FetchResult};

/// Maximum number of redirects followed for one fetch.
pub const MAX_REDIRECTS: usize = 10;

/// GET `url`, following 301/302/307/308 up to [`MAX_REDIRECTS`] hops.
///
/// Returns the final response only when it is a 200. Redirect bodies are
/// drained before the next hop. A redirect without `Location` and a chain
/// longer than the bound are terminal; any other status is reported as
/// [`FetchError::HttpStatus`] for the caller to interpret.
pub async fn fetch_following_redirects(
    transport: &dyn HttpTransport,
    url: &str,
) -> FetchResult<HttpResponse> {
    let mut current = url.to_string();

    for hop in 0..=MAX_REDIRECTS {
        let response = transport.get(&current).await?;

        if response.status == 200 {
            return Ok(response);
        }

        if !response.is_redirect() {
            return Err(FetchError::HttpStatus {
                status: response.status,
                url: current,
            });
        }

        if hop == MAX_REDIRECTS {
            return Err(FetchError::TooManyRedirects {
                url: url.to_string(),
                limit: MAX_REDIRECTS,
            });
        }

        let Some(location) = response.location.clone() else {
            return Err(FetchError::MissingRedirectLocation { url: current });
        };
        response.drain().await?;

        let next = resolve_location(&current, &location);
        tracing::debug!(hop = hop + 1, from = %current, to = %next, "following redirect");
        current = next;
    }

    Err(FetchError::TooManyRedirects {
        url: url.to_string(),
        limit: MAX_REDIRECTS,
    })
}

/// Resolve a possibly relative `Location` against the URL that sent it.
fn resolve_location(base: &str, location: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(location))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| location.to_string())
}
