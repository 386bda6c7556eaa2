// Core moderation module - warning escalation and ban business logic.
// Following the same pattern as the content module.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
