// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "content/mod.rs"]
pub mod content;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "session/mod.rs"]
pub mod session;
