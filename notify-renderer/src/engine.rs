//! Tera rendering engine for rule-file message templates.
//!
//! Templates come from user-controlled rule files, so they are compiled one
//! at a time into a fresh [`Tera`] instance and never share state. Undefined
//! variables are errors, not empty strings.

use tera::Tera;

use crate::context::MessageContext;
use crate::error::TemplateError;

/// Stateless renderer for one-off rule-file templates.
pub struct MessageRenderer;

impl MessageRenderer {
    /// Render `template` against `ctx`.
    ///
    /// `name` identifies the template in error messages; callers pass the
    /// rule file path it came from. Autoescaping is off: the output is chat
    /// markup, not HTML.
    pub fn render(
        name: &str,
        template: &str,
        ctx: &MessageContext<'_>,
    ) -> Result<String, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(name, template)
            .map_err(|source| TemplateError::Syntax {
                name: name.to_string(),
                source,
            })?;
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = tera
            .render(name, &tera_ctx)
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source,
            })?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
