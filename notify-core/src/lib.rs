//! notify-on-change core library: domain types, rule files, errors.
//!
//! - [`types`]: change kinds, per-file and aggregated change records
//! - [`rule`]: the per-directory rule file schema and its parser
//! - [`settings`]: overridable resolver constants
//! - [`dedup`]: order-preserving string deduplication
//! - [`error`]: [`ConfigError`] and [`TransportError`]

pub mod dedup;
pub mod error;
pub mod rule;
pub mod settings;
pub mod types;

pub use dedup::{dedup, dedup_extend};
pub use error::{ConfigError, TransportError};
pub use rule::{KindRule, RuleFile};
pub use settings::ResolverSettings;
pub use types::{
    AggregatedChange, Author, Change, ChangeKind, ChangeMetadata, ChangeSource, Recipients,
};
