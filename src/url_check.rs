//! Web URI checks for the RPC and block explorer fields.

use url::Url;

/// Characters RFC 3986 allows anywhere in a URI (reserved, unreserved, `%`).
fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ":/?#[]@!$&'()*+,;=.-_~%".contains(c)
}

/// `http`/`https` URI with an authority and a non-empty host.
pub fn is_web_uri(candidate: &str) -> bool {
    if candidate.is_empty() || !candidate.chars().all(is_uri_char) {
        return false;
    }
    let lower = candidate.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// True when the user most likely forgot the scheme: prefixing `http://`
/// yields a web URI and the input is not a bare scheme on its own.
pub fn is_valid_when_appended(candidate: &str) -> bool {
    is_web_uri(&format!("http://{candidate}")) && !matches!(candidate, "http://" | "https://")
}
