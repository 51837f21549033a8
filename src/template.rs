//! Template resolution for output paths and clone URIs.
//!
//! Templates use Go-template style actions over exactly two variables,
//! `.Org` and `.Repo`, taken from the job's `org/repo` identifier:
//!
//! ```text
//! {{ .Org }}/{{ .Repo }}/presubmits.yaml
//! https://git.example.com/{{ .Org | lower }}/{{ .Repo }}.git
//! ```
//!
//! An action may pipe its value through `lower`, `upper` or `trim`. A `-`
//! just inside the delimiters (`{{- ... -}}`) trims the surrounding
//! whitespace, as in Go.
//!
//! [`render`] is strict and reports any problem. [`resolve`] is what the
//! pipeline uses: on failure it logs a warning, records the error, and
//! returns the template unchanged.

use log::warn;

use crate::error::{Error, ErrorCollection, Result};
use crate::job::OrgRepo;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// The values a template may reference.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub org: &'a str,
    pub repo: &'a str,
}

impl<'a> From<&'a OrgRepo> for TemplateVars<'a> {
    fn from(org_repo: &'a OrgRepo) -> Self {
        Self {
            org: &org_repo.org,
            repo: &org_repo.repo,
        }
    }
}

/// Evaluate `template`, failing on any syntax or evaluation error.
pub fn render(template: &str, vars: &TemplateVars) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open.find(CLOSE).ok_or_else(|| Error::Template {
            message: format!("unclosed action in '{}'", template),
            variable: None,
        })?;

        let mut action = &after_open[..end];
        rest = &after_open[end + CLOSE.len()..];

        if let Some(stripped) = action.strip_prefix("- ") {
            action = stripped;
            out.truncate(out.trim_end().len());
        }
        if let Some(stripped) = action.strip_suffix(" -") {
            action = stripped;
            rest = rest.trim_start();
        }

        out.push_str(&evaluate(action, vars)?);
    }

    out.push_str(rest);
    Ok(out)
}

/// Evaluate `template`, falling back to the raw template on failure.
///
/// An empty template resolves to an empty string.
pub fn resolve(template: &str, vars: &TemplateVars, errors: &mut ErrorCollection) -> String {
    if template.is_empty() {
        return String::new();
    }

    match render(template, vars) {
        Ok(value) => value,
        Err(e) => {
            warn!("Using unresolved template '{}': {}", template, e);
            errors.push(e);
            template.to_string()
        }
    }
}

fn evaluate(action: &str, vars: &TemplateVars) -> Result<String> {
    let mut stages = action.split('|').map(str::trim);

    let value = match stages.next().unwrap_or_default() {
        "" => {
            return Err(Error::Template {
                message: "empty action".to_string(),
                variable: None,
            })
        }
        ".Org" => vars.org.to_string(),
        ".Repo" => vars.repo.to_string(),
        field if field.starts_with('.') => {
            return Err(Error::Template {
                message: "undefined variable".to_string(),
                variable: Some(field.trim_start_matches('.').to_string()),
            })
        }
        other => {
            return Err(Error::Template {
                message: format!("unsupported expression '{}'", other),
                variable: None,
            })
        }
    };

    stages.try_fold(value, |value, function| match function {
        "lower" => Ok(value.to_lowercase()),
        "upper" => Ok(value.to_uppercase()),
        "trim" => Ok(value.trim().to_string()),
        other => Err(Error::Template {
            message: format!("function \"{}\" not defined", other),
            variable: None,
        }),
    })
}
