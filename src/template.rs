use crate::tera_utils::{NindentFilter, QuoteFilter, TeraFilter};
use std::error::Error as StdError;
use tera::Error as TeraError;
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot render template `{template}`: {msg}")]
pub struct TemplateError {
    pub template: String,
    pub msg: String,
}

/// A set of `.j2.` templates compiled once, rendered as many times as needed.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// `templates` are `(name, content)` pairs, names following the `<path>/<file>.j2.<ext>` convention.
    pub fn new(templates: &[(&str, &str)]) -> Result<TemplateEngine, TemplateError> {
        let mut tera = Tera::default();
        // rendered documents are yaml, nothing to escape
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates.to_vec()).map_err(|e| TemplateError {
            template: templates
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<&str>>()
                .join(", "),
            msg: describe_tera_error(&e),
        })?;

        // inject additional filters to tera
        tera.register_filter(QuoteFilter::name(), QuoteFilter::implementation());
        tera.register_filter(NindentFilter::name(), NindentFilter::implementation());

        Ok(TemplateEngine { tera })
    }

    pub fn render(&self, j2_path: &str, context: &Context) -> Result<RenderedTemplate, TemplateError> {
        debug!("rendering template {}", j2_path);
        let content = self.tera.render(j2_path, context).map_err(|e| TemplateError {
            template: j2_path.to_string(),
            msg: describe_tera_error(&e),
        })?;

        let j2_path_split = j2_path.split('/').collect::<Vec<_>>();
        let j2_root_path: String = j2_path_split[..j2_path_split.len() - 1].join("/");
        let file_name = j2_path_split[j2_path_split.len() - 1].replace(".j2", "");

        Ok(RenderedTemplate::new(j2_root_path, file_name, content))
    }
}

fn describe_tera_error(e: &TeraError) -> String {
    let error_msg = match &e.kind {
        tera::ErrorKind::TemplateNotFound(x) => format!("template not found: {x}"),
        tera::ErrorKind::Msg(x) => format!("tera error: {x}"),
        tera::ErrorKind::CircularExtend { tpl, inheritance_chain } => {
            format!("circular extend - template: {tpl}, inheritance chain: {inheritance_chain:?}")
        }
        tera::ErrorKind::MissingParent { current, parent } => {
            format!("missing parent - current: {current}, parent: {parent}")
        }
        tera::ErrorKind::FilterNotFound(x) => format!("filter not found: {x}"),
        tera::ErrorKind::TestNotFound(x) => format!("test not found: {x}"),
        tera::ErrorKind::InvalidMacroDefinition(x) => {
            format!("invalid macro definition: {x}")
        }
        tera::ErrorKind::FunctionNotFound(x) => format!("function not found: {x}"),
        tera::ErrorKind::Json(x) => format!("json error: {x:?}"),
        tera::ErrorKind::CallFunction(x) => format!("call function: {x}"),
        tera::ErrorKind::CallFilter(x) => format!("call filter: {x}"),
        tera::ErrorKind::CallTest(x) => format!("call test: {x}"),
        tera::ErrorKind::__Nonexhaustive => "non exhaustive error".to_string(),
        tera::ErrorKind::Io(x) => format!("io error {x:?}"),
        tera::ErrorKind::Utf8Conversion { .. } => "utf-8 conversion issue".to_string(),
    };

    // tera puts the actual cause (missing variable, failing filter) in the source chain
    let mut causes = vec![error_msg];
    let mut source = e.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    causes.join(": ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub path: String,
    pub file_name: String,
    pub content: String,
}

impl RenderedTemplate {
    pub fn new(path: String, file_name: String, content: String) -> Self {
        RenderedTemplate {
            path,
            file_name,
            content,
        }
    }

    pub fn path_and_file_name(&self) -> String {
        if self.path.trim().is_empty() || self.path.as_str() == "." {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.path.as_str(), self.file_name.as_str())
        }
    }
}
