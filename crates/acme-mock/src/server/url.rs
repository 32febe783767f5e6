//! Absolute URL construction rooted at the inbound request's own host.
//!
//! Every handler that embeds self-referential links (directory entries, the
//! account `orders` link, order `finalize`/`authorizations` links) builds them
//! here, so the mock answers correctly no matter which hostname or port a
//! client reached it through.

/// Build an absolute `https` URL for `path` on `host`.
///
/// `host` is the value of the inbound `Host` header and may carry a port.
/// A missing leading slash on `path` is tolerated.
pub fn absolute(host: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("https://{host}{path}")
    } else {
        format!("https://{host}/{path}")
    }
}

/// Join a resource name under a base path.
///
/// Duplicate and trailing slashes collapse, so instance URLs such as
/// `/finalize/3` stay canonical regardless of how the parts are written.
pub fn join(base: &str, leaf: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        leaf.trim_start_matches('/')
    )
}
