//! # notify-routing
//!
//! Hierarchical rule resolution and change routing.
//!
//! For every changed file the [`ConfigResolver`] fetches one rule file per
//! ancestor directory concurrently and links them into a [`ConfigChain`].
//! The [`ChangeBuilder`] turns each chain into a [`Change`](notify_core::Change),
//! [`merge_common`] folds changes per destination, and the [`Dispatcher`]
//! hands the results to a [`MessageSender`].
//!
//! [`Notifier::resolve_destinations_and_send`] runs the whole pipeline.

pub mod aggregator;
pub mod builder;
pub mod dispatcher;
pub mod error;
pub mod fan_out;
pub mod node;
pub mod payload;
pub mod pipeline;
pub mod resolver;
pub mod transport;

pub use aggregator::merge_common;
pub use builder::ChangeBuilder;
pub use dispatcher::Dispatcher;
pub use error::RoutingError;
pub use node::{ConfigChain, ConfigNode, NodeRef};
pub use payload::{Link, MessagePayload};
pub use pipeline::{plan, prepare_changed_files, Notifier};
pub use resolver::ConfigResolver;
pub use transport::{ContentReader, MessageSender};
