
/// Router Module Index
///
/// Groups the page endpoints by the tier of caller they are meant for. The tiers are
/// documentation only: every handler takes the `Actor` explicitly and the lifecycle
/// runs the real authorization gate, so no router-level middleware is involved.

/// Reads open to any caller (anonymous included). Drafts are filtered or gated inside
/// the lifecycle.
pub mod public;

/// Create and edit endpoints (editor and above).
pub mod editorial;

/// Publication, deletion and oversight endpoints (admin and above).
pub mod admin;
