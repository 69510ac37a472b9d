use ammonia::clean_text;
use contracts::shared::filter_form::{FilterAction, FilterMap};

use super::host::FilterForm;

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    /// `(value, label)` pairs, the first one is usually the "any" option with an empty value
    Select(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    value: Option<String>,
}

/// Server-rendered filter form with the `filter` and `reset` submit buttons
#[derive(Debug, Clone)]
pub struct HtmlForm {
    action: String,
    fields: Vec<Field>,
    classes: Vec<String>,
}

impl HtmlForm {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn add_text(&mut self, name: &str, label: &str) -> &mut Self {
        self.push_field(name, label, FieldKind::Text)
    }

    pub fn add_select(&mut self, name: &str, label: &str, options: &[(&str, &str)]) -> &mut Self {
        let options = options
            .iter()
            .map(|(value, label)| (value.to_string(), label.to_string()))
            .collect();
        self.push_field(name, label, FieldKind::Select(options))
    }

    fn push_field(&mut self, name: &str, label: &str, kind: FieldKind) -> &mut Self {
        self.fields.push(Field {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            value: None,
        });
        self
    }

    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Loads a urlencoded submission into the fields.
    ///
    /// Returns the action of the clicked submit button, `None` when the body
    /// does not come from this form.
    pub fn load_submission(&mut self, body: &[(String, String)]) -> Option<FilterAction> {
        let action = body
            .iter()
            .find_map(|(name, _)| FilterAction::from_button_name(name))?;

        for field in self.fields.iter_mut() {
            field.value = body
                .iter()
                .rev()
                .find(|(name, _)| *name == field.name)
                .map(|(_, value)| value.trim().to_string());
        }
        Some(action)
    }

    fn render_field(&self, field: &Field) -> String {
        let id = format!("frm-{}", clean_text(&field.name));
        let name = clean_text(&field.name);
        let current = field.value.as_deref().unwrap_or("");

        let control = match &field.kind {
            FieldKind::Text => format!(
                r#"<input type="text" id="{}" name="{}" value="{}">"#,
                id,
                name,
                clean_text(current)
            ),
            FieldKind::Select(options) => {
                let options = options
                    .iter()
                    .map(|(value, label)| {
                        format!(
                            r#"<option value="{}"{}>{}</option>"#,
                            clean_text(value),
                            if value == current { " selected" } else { "" },
                            clean_text(label)
                        )
                    })
                    .collect::<String>();
                format!(r#"<select id="{}" name="{}">{}</select>"#, id, name, options)
            }
        };

        format!(
            r#"<div class="filter-field"><label for="{}">{}</label>{}</div>"#,
            id,
            clean_text(&field.label),
            control
        )
    }
}

impl FilterForm for HtmlForm {
    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.name.clone()).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Unset fields are reported as empty strings, the way a browser submits them
    fn values(&self) -> FilterMap {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), Some(field.value.clone().unwrap_or_default())))
            .collect()
    }

    fn set_value(&mut self, name: &str, value: Option<&str>) {
        if let Some(field) = self.fields.iter_mut().find(|field| field.name == name) {
            field.value = value.map(str::to_owned);
        }
    }

    fn set_values(&mut self, values: &FilterMap, erase: bool) {
        for field in self.fields.iter_mut() {
            match values.get_entry(&field.name) {
                Some(value) => field.value = value.clone(),
                None if erase => field.value = None,
                None => {}
            }
        }
    }

    fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|existing| existing == class) {
            self.classes.push(class.to_string());
        }
    }

    fn validate(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .fields
            .iter()
            .filter_map(|field| {
                let FieldKind::Select(options) = &field.kind else {
                    return None;
                };
                let value = field.value.as_deref().filter(|value| !value.is_empty())?;
                if options.iter().any(|(option, _)| option == value) {
                    None
                } else {
                    Some(format!("{}: unknown option '{}'", field.label, value))
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn render(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|field| self.render_field(field))
            .collect::<String>();
        let buttons = [FilterAction::Filter, FilterAction::Reset]
            .iter()
            .map(|action| {
                format!(
                    r#"<button type="submit" name="{}" value="1"{}>{}</button>"#,
                    action.button_name(),
                    if *action == FilterAction::Reset {
                        " formnovalidate"
                    } else {
                        ""
                    },
                    action.label()
                )
            })
            .collect::<String>();

        format!(
            r#"<form method="post" action="{}" class="{}">{}<div class="filter-buttons">{}</div></form>"#,
            clean_text(&self.action),
            clean_text(&self.classes.join(" ")),
            fields,
            buttons
        )
    }
}
