//! API constants
//!
//! All routes are versioned under a single prefix so the frontend can pin one
//! base path per deployment.

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Current API version segment
pub const API_VERSION: &str = "v0";

/// Versioned prefix for all lead endpoints, e.g. `/api/v0/leads/contact`.
pub const API_PREFIX: &str = "/api/v0";
