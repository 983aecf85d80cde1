mod commands;
mod error;
mod events;
pub mod lifecycle;
mod models;
pub mod moderation;
pub mod reactions;
pub mod roles;
pub mod thread;

pub use commands::AppCommand;
pub use error::EngineError;
pub use events::IngestEvent;
pub use models::{Actor, BanRecord, BanTarget, ChapterId, Comment, CommentKind, Profile};
pub use moderation::{ContentModerator, ModerationVerdict, Severity, WordFilter};
pub use reactions::{Reaction, ReactionKind, ReactionTally};
pub use roles::{has_permission, Capability, Role};
