//! HTML views
//!
//! Page templates are Tera files embedded in the binary. A deployment may
//! point `ui.templates_dir` at a directory of overrides; any template found
//! there replaces the embedded one of the same name.
//!
//! Every page receives the standard variables from [`PageVars`]: site name,
//! the signed-in account, the pending flash, the request path and the
//! current year.

mod error;

pub use error::ViewError;

use chrono::Datelike;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error as _;
use std::path::Path;
use tera::{Context, Tera, Value};

use crate::models::{AccountRole, NewsStatus, SystemAccount};
use crate::session::Flash;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct Templates;

/// Template renderer
pub struct Renderer {
    tera: Tera,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

impl Renderer {
    /// Renderer over the embedded templates only
    pub fn new() -> Result<Self, ViewError> {
        Self::build(embedded_templates()?)
    }

    /// Embedded templates with overrides read from `dir`
    pub fn with_overrides(dir: &Path) -> Result<Self, ViewError> {
        let mut templates = embedded_templates()?;
        let mut overridden = 0usize;
        collect_dir(dir, dir, &mut templates, &mut overridden)?;
        tracing::info!(dir = %dir.display(), overridden, "loaded template overrides");
        Self::build(templates)
    }

    fn build(templates: BTreeMap<String, String>) -> Result<Self, ViewError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().map(|(name, body)| (name.as_str(), body.as_str())))
            .map_err(|e| ViewError::TemplateError(describe(&e)))?;
        tera.register_filter("role_name", role_name_filter);
        tera.register_filter("status_label", status_label_filter);
        Ok(Self { tera })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }

    /// Render a template with a prepared context
    pub fn render(&self, template: &str, context: &Context) -> Result<String, ViewError> {
        if !self.has_template(template) {
            return Err(ViewError::NotFound(template.to_string()));
        }
        self.tera
            .render(template, context)
            .map_err(|e| ViewError::TemplateError(format!("Failed to render '{}': {}", template, describe(&e))))
    }

    /// Render a page with the standard variables added
    pub fn render_page(&self, template: &str, context: &Context, vars: &PageVars) -> Result<String, ViewError> {
        let mut full = context.clone();
        full.insert("site_name", &vars.site_name);
        full.insert("request_path", &vars.request_path);
        full.insert("year", &vars.year);
        full.insert("account", &vars.account);
        full.insert("flash", &vars.flash);
        full.insert("is_staff", &vars.account.as_ref().is_some_and(|a| a.is_staff()));
        full.insert("is_admin", &vars.account.as_ref().is_some_and(|a| a.is_admin()));
        self.render(template, &full)
    }
}

/// Variables every page receives
#[derive(Debug, Clone, Serialize)]
pub struct PageVars {
    pub site_name: String,
    pub request_path: String,
    pub year: i32,
    pub account: Option<SystemAccount>,
    pub flash: Option<Flash>,
}

impl PageVars {
    pub fn new(site_name: impl Into<String>, request_path: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
            account: None,
            flash: None,
        }
    }

    pub fn with_account(mut self, account: Option<SystemAccount>) -> Self {
        self.account = account;
        self
    }

    pub fn with_flash(mut self, flash: Option<Flash>) -> Self {
        self.flash = flash;
        self
    }
}

fn embedded_templates() -> Result<BTreeMap<String, String>, ViewError> {
    let mut templates = BTreeMap::new();
    for name in Templates::iter() {
        let file = Templates::get(&name).ok_or_else(|| ViewError::NotFound(name.to_string()))?;
        let body = String::from_utf8(file.data.into_owned())
            .map_err(|e| ViewError::TemplateError(format!("{} is not UTF-8: {}", name, e)))?;
        templates.insert(name.to_string(), body);
    }
    Ok(templates)
}

fn collect_dir(
    base: &Path,
    current: &Path,
    templates: &mut BTreeMap<String, String>,
    overridden: &mut usize,
) -> Result<(), ViewError> {
    for entry in std::fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(base, &path, templates, overridden)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let name = path
                .strip_prefix(base)
                .map_err(|e| ViewError::TemplateError(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            templates.insert(name, std::fs::read_to_string(&path)?);
            *overridden += 1;
        }
    }
    Ok(())
}

/// Flatten a Tera error chain into one message
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// `{{ account.AccountRole | role_name }}` -> "Admin" / "Staff" / "Lecturer"
fn role_name_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let role = match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|code| i32::try_from(code).ok())
            .and_then(AccountRole::from_code),
        Value::String(s) => s.parse::<AccountRole>().ok(),
        _ => None,
    };
    Ok(Value::String(
        role.map(|r| r.to_string()).unwrap_or_else(|| "Unknown".to_string()),
    ))
}

/// `{{ article.NewsStatus | status_label }}` -> "Active" / "Inactive"
fn status_label_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let status = match value {
        Value::Bool(true) => Some(NewsStatus::Active),
        Value::Bool(false) => Some(NewsStatus::Inactive),
        Value::Number(n) => n.as_i64().and_then(|code| NewsStatus::parse(&code.to_string())),
        Value::String(s) => NewsStatus::parse(s),
        _ => None,
    };
    let label = match status {
        Some(NewsStatus::Active) => "Active",
        Some(NewsStatus::Inactive) => "Inactive",
        None => "Unknown",
    };
    Ok(Value::String(label.to_string()))
}

#[cfg(test)]
mod tests;
