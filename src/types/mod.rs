// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Target names are a closed set; IDs use phantom types to prevent confusion.

mod git_ref;
mod id;
mod target;

pub use git_ref::{GitRef, GitRefError};
pub use id::{BackupId, EnvironmentId, Id, NotificationId, PreviewId};
pub use target::{TARGET_NAMES, TargetName, TargetNameError};
