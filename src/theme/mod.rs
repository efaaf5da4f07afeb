//! Public site templates
//!
//! Server-side rendering for the public pages using Tera. Templates are
//! embedded into the binary from `templates/`, so a release build needs no
//! files next to it.

use anyhow::Result;
use rust_embed::RustEmbed;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

mod error;


pub use error::ThemeError;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct TemplateAssets;

/// Renders the public pages
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every embedded template.
    ///
    /// Base layouts are registered first so child templates can extend them.
    pub fn new() -> Result<Self> {
        let mut templates: Vec<(String, String)> = Vec::new();
        for name in TemplateAssets::iter() {
            let Some(file) = TemplateAssets::get(&name) else {
                continue;
            };
            let content = String::from_utf8(file.data.into_owned()).map_err(|_| {
                ThemeError::TemplateError(format!("Template {} is not valid UTF-8", name))
            })?;
            templates.push((name.to_string(), content));
        }

        Self::from_templates(templates)
    }

    /// Build an engine from in-memory `(name, source)` pairs
    pub fn from_templates(mut templates: Vec<(String, String)>) -> Result<Self> {
        templates.sort_by(|a, b| {
            let a_is_base = a.0 == "base.html" || a.0.ends_with("/base.html");
            let b_is_base = b.0 == "base.html" || b.0.ends_with("/base.html");
            b_is_base.cmp(&a_is_base)
        });

        let mut tera = Tera::default();
        for (name, content) in &templates {
            tera.add_raw_template(name, content).map_err(|e| {
                ThemeError::TemplateError(format!("Failed to add template {}: {}", name, e))
            })?;
        }
        tera.build_inheritance_chains().map_err(|e| {
            ThemeError::TemplateError(format!("Failed to build template inheritance: {}", e))
        })?;

        tracing::debug!("Loaded {} templates", templates.len());
        Ok(Self { tera })
    }

    /// Whether a template with this name is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &TeraContext) -> Result<String, ThemeError> {
        if !self.has_template(template_name) {
            return Err(ThemeError::NotFound(template_name.to_string()));
        }

        self.tera.render(template_name, context).map_err(|e| {
            let mut msg = format!("Failed to render template '{}': {}", template_name, e);
            let mut source = e.source();
            while let Some(err) = source {
                msg.push_str(&format!("\n  Caused by: {}", err));
                source = err.source();
            }
            ThemeError::TemplateError(msg)
        })
    }
}
