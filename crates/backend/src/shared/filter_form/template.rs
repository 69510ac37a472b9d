use std::path::{Path, PathBuf};

use super::error::FilterFormError;
use super::host::TemplateEngine;

/// Template read from disk on every render, `{{ name }}` placeholders are
/// replaced with the bound values as is.
#[derive(Debug, Default)]
pub struct FileTemplate {
    file: Option<PathBuf>,
    vars: Vec<(String, String)>,
}

impl FileTemplate {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateEngine for FileTemplate {
    fn bind(&mut self, name: &str, value: String) {
        match self.vars.iter_mut().find(|(existing, _)| existing == name) {
            Some(var) => var.1 = value,
            None => self.vars.push((name.to_string(), value)),
        }
    }

    fn set_file(&mut self, path: &Path) {
        self.file = Some(path.to_path_buf());
    }

    fn render(&mut self) -> Result<String, FilterFormError> {
        let path = self.file.as_ref().ok_or(FilterFormError::TemplateNotSet)?;
        let source = std::fs::read_to_string(path).map_err(|source| FilterFormError::Template {
            path: path.clone(),
            source,
        })?;

        // один проход по исходнику: подставленные значения повторно не разбираются
        let mut output = String::with_capacity(source.len());
        let mut rest = source.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            output.push_str(&rest[..start]);
            let name = after[..end].trim();
            match self.vars.iter().find(|(bound, _)| bound == name) {
                Some((_, value)) => output.push_str(value),
                None => output.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }
        output.push_str(rest);
        Ok(output)
    }
}
