//! # notify-transport
//!
//! Concrete collaborators for the routing engine:
//!
//! - [`GithubClient`] reads rule files through the contents API and reports
//!   what a pull request or commit changed
//! - [`SlackSender`] posts notifications and subscriber mentions
//! - [`FsContentReader`] reads rule files from a local checkout
//! - [`EventContext`] describes the triggering GitHub Actions event

pub mod error;
pub mod event;
pub mod fs;
pub mod github;
pub mod slack;

pub use error::{ClientError, EventError};
pub use event::EventContext;
pub use fs::FsContentReader;
pub use github::{ChangeInfo, GithubClient};
pub use slack::SlackSender;
