//! Identifier sanitization
//!
//! Turns display strings (service names, cluster URLs, namespaces) into
//! lower-case `[0-9a-z-]` identifiers that are safe to use as Kubernetes
//! resource names and CI job keys.

/// Hard ceiling for generated resource names (Kubernetes DNS label length)
pub const MAX_NAME_LEN: usize = 63;

/// Sanitize an arbitrary string into a canonical identifier.
///
/// Lower-cases the input, strips a leading `https://` or `http://`, replaces
/// every character outside `[0-9a-z]` with `-`, collapses `-` runs and trims
/// leading and trailing `-`. The transform is idempotent.
pub fn sanitize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    let mut out = String::with_capacity(stripped.len());
    // Start as if a dash was just written so leading separators are dropped
    let mut last_was_dash = true;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }

    while out.ends_with('-') {
        out.pop();
    }

    out
}

/// Canonical cluster identity for a destination.
///
/// A symbolic cluster name wins and is only lower-cased; otherwise the
/// cluster API URL is sanitized.
pub fn cluster_identity(name: Option<&str>, server: Option<&str>) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => name.to_lowercase(),
        None => sanitize(server.unwrap_or_default()),
    }
}
