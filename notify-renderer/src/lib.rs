//! # notify-renderer
//!
//! Tera-based rendering of the per-directory `messageTemplate` strings.
//!
//! ## Usage
//!
//! ```rust
//! use notify_core::{ChangeKind, RuleFile};
//! use notify_renderer::{MessageContext, MessageRenderer};
//!
//! let rule = RuleFile { pretty_name: vec!["Docs".into()], ..RuleFile::default() };
//! let ctx = MessageContext::new(&rule, "docs", "docs/index.md", ChangeKind::Commit);
//! let text = MessageRenderer::render("docs/rules.yaml", "{{ pretty_name | join(sep=', ') }}", &ctx);
//! assert_eq!(text.unwrap(), "Docs");
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::MessageContext;
pub use engine::MessageRenderer;
pub use error::TemplateError;
