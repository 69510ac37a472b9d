//! Collaborators the control expects from its host: the form, the state store that
//! survives redirects, the current request and the template renderer.

use std::path::Path;

use contracts::shared::filter_form::FilterMap;

use super::error::FilterFormError;

/// Form subsystem that owns the filter fields
pub trait FilterForm {
    /// Field names in declaration order
    fn field_names(&self) -> Vec<String>;

    fn has_field(&self, name: &str) -> bool {
        self.field_names().iter().any(|field| field == name)
    }

    /// Current values of every field
    fn values(&self) -> FilterMap;

    fn set_value(&mut self, name: &str, value: Option<&str>);

    /// Sets the listed fields. With `erase`, fields missing from `values` are cleared.
    fn set_values(&mut self, values: &FilterMap, erase: bool);

    /// Adds a CSS class to the rendered form root
    fn add_class(&mut self, class: &str);

    /// Checks the submitted values, returns the error messages
    fn validate(&self) -> Result<(), Vec<String>> {
        Ok(())
    }

    fn render(&self) -> String;
}

/// Store for values that must survive across requests of one UI instance
pub trait PersistentState {
    fn get(&self, key: &str) -> Option<String>;

    /// `None` removes the value
    fn set(&mut self, key: &str, value: Option<String>);
}

/// The request being handled
pub trait RequestContext {
    fn is_ajax(&self) -> bool;

    /// Asks the host to re-run the current action after the handler finishes
    fn redirect_this(&mut self) -> Result<(), FilterFormError>;
}

pub trait TemplateEngine {
    fn bind(&mut self, name: &str, value: String);

    fn set_file(&mut self, path: &Path);

    fn render(&mut self) -> Result<String, FilterFormError>;
}
