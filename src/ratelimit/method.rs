//! HTTP methods a scoped rate may be bound to.

/// The nine standard HTTP method tokens.
pub const HTTP_METHODS: [&str; 9] = [
    "GET", "PUT", "POST", "HEAD", "TRACE", "PATCH", "DELETE", "CONNECT", "OPTIONS",
];

/// Check whether `method` is a recognized HTTP method, ignoring case.
pub fn is_supported_method(method: &str) -> bool {
    HTTP_METHODS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(method))
}
