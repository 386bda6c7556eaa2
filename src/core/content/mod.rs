// Core content module - text normalization, profanity matching, and
// listing/message validation. Pure checks only; recording violations
// against a user is the moderation module's job.

pub mod normalize;
pub mod profanity;
pub mod validator;

pub use normalize::*;
pub use profanity::*;
pub use validator::*;
