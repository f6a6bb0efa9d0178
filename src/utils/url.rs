//! URL utilities for consistent URL handling
//!
//! The advisor backend is addressed by a base URL from config or the
//! command line; these helpers keep endpoint construction free of double
//! or missing slashes regardless of how the base was written.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use neuvo::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000"), "http://127.0.0.1:5000");
/// assert_eq!(normalize_base_url("http://127.0.0.1:5000/"), "http://127.0.0.1:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use neuvo::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://127.0.0.1:5000", "api/ask"),
///     "http://127.0.0.1:5000/api/ask"
/// );
/// assert_eq!(
///     construct_api_url("http://127.0.0.1:5000/", "/api/upload-doc"),
///     "http://127.0.0.1:5000/api/upload-doc"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
