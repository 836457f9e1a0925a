//! HTTP plumbing shared by every endpoint call.

use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::options::{SecretString, TransportOptions};

/// Build a configured HTTP client from transport options.
///
/// Applies common configuration like timeouts and proxies.
pub fn build_http_client(options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &options.proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build()
}

/// Attach the `Authorization` header when a credential is present.
///
/// The backend expects the raw token value, not a `Bearer` scheme.
pub fn authorize(request: RequestBuilder, credential: &Option<SecretString>) -> RequestBuilder {
    match credential {
        Some(token) => request.header(reqwest::header::AUTHORIZATION, token.expose_secret()),
        None => request,
    }
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
