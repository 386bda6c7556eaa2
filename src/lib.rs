// Moderation and session-authentication core for the marketplace.
//
// **Architecture Overview:**
// - `core/` = Business logic (framework-agnostic: no sqlx, no HTTP)
// - `infra/` = Implementations of core traits (SQLite, in-memory)
//
// The web layer calls into this crate on every request: first
// `SessionService::verify` to resolve the caller, then the content
// validator before persisting any user-supplied text, and the
// moderation service when a violation needs to be recorded.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a pile of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;
