use std::path::{Path, PathBuf};

use contracts::shared::filter_form::{Direction, FilterAction, FilterMap};

use super::codec;
use super::error::FilterFormError;
use super::host::{FilterForm, PersistentState, RequestContext, TemplateEngine};
use super::normalizer::{self, DataFilter};

/// Observer notified after a submit or reset with the display-ready filter.
///
/// The first listener that fails stops the notification of the rest.
pub type Listener<F> =
    Box<dyn Fn(&FilterFormControl<F>, &FilterMap) -> anyhow::Result<()> + Send + Sync>;

/// Data accepted by [`FilterFormControl::set_data`]
#[derive(Debug, Clone)]
pub enum FilterInput {
    Map(FilterMap),
    Token(String),
}

impl From<FilterMap> for FilterInput {
    fn from(map: FilterMap) -> Self {
        FilterInput::Map(map)
    }
}

impl From<String> for FilterInput {
    fn from(token: String) -> Self {
        FilterInput::Token(token)
    }
}

impl From<&str> for FilterInput {
    fn from(token: &str) -> Self {
        FilterInput::Token(token.to_string())
    }
}

/// Filter form whose values are kept in a persisted query-string token
/// instead of a server-side session.
///
/// The control lives for one request: the host loads the token with
/// [`load_state`](Self::load_state), runs an action or renders, and writes the
/// token back with [`save_state`](Self::save_state).
pub struct FilterFormControl<F: FilterForm> {
    name: String,
    form: F,
    data: Option<String>,
    default_values: FilterMap,
    ajax_request: bool,
    template_file: PathBuf,
    data_filter: Option<Box<DataFilter>>,
    on_filter: Vec<Listener<F>>,
    on_reset: Vec<Listener<F>>,
}

impl<F: FilterForm> FilterFormControl<F> {
    pub const TYPE_NAME: &'static str = "FilterFormControl";

    pub fn new(name: impl Into<String>, form: F) -> Self {
        Self {
            name: name.into(),
            form,
            data: None,
            default_values: FilterMap::new(),
            ajax_request: false,
            template_file: Self::default_template_file(),
            data_filter: None,
            on_filter: Vec::new(),
            on_reset: Vec::new(),
        }
    }

    /// `templates/<TYPE_NAME>.html` inside the backend crate
    pub fn default_template_file() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("templates")
            .join(format!("{}.html", Self::TYPE_NAME))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the persisted token in the host state store
    pub fn persistent_key(&self) -> String {
        format!("{}-data", self.name)
    }

    /// Persisted token, `None` when no filter is active
    pub fn token(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn set_data_filter(
        &mut self,
        data_filter: impl Fn(&FilterMap, Direction) -> Option<FilterMap> + Send + Sync + 'static,
    ) -> &mut Self {
        self.data_filter = Some(Box::new(data_filter));
        self
    }

    pub fn set_ajax_request(&mut self, value: bool) -> &mut Self {
        self.ajax_request = value;
        self
    }

    pub fn is_ajax_request(&self) -> bool {
        self.ajax_request
    }

    pub fn set_default_values(&mut self, values: FilterMap) -> &mut Self {
        self.default_values = values;
        self
    }

    pub fn default_values(&self) -> &FilterMap {
        &self.default_values
    }

    /// An empty path keeps the current template
    pub fn set_template_file(&mut self, file: impl AsRef<Path>) -> &mut Self {
        let file = file.as_ref();
        if !file.as_os_str().is_empty() {
            self.template_file = file.to_path_buf();
        }
        self
    }

    pub fn template_file(&self) -> &Path {
        &self.template_file
    }

    pub fn on_filter(
        &mut self,
        listener: impl Fn(&Self, &FilterMap) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_filter.push(Box::new(listener));
        self
    }

    pub fn on_reset(
        &mut self,
        listener: impl Fn(&Self, &FilterMap) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_reset.push(Box::new(listener));
        self
    }

    pub fn load_state(&mut self, state: &dyn PersistentState) {
        self.data = state
            .get(&self.persistent_key())
            .filter(|token| !token.is_empty());
    }

    pub fn save_state(&self, state: &mut dyn PersistentState) {
        state.set(&self.persistent_key(), self.data.clone());
    }

    /// Decoded filter completed with every form field and the defaults
    pub fn get_data(&self) -> FilterMap {
        let stored = codec::decode(self.data.as_deref());
        normalizer::prepare_for_display(
            stored,
            self.form.field_names(),
            &self.default_values,
            self.data_filter.as_deref(),
        )
    }

    /// Persists a filter without firing events or redirecting, then fills the form
    pub fn set_data(&mut self, data: impl Into<FilterInput>) -> &mut Self {
        let raw = match data.into() {
            FilterInput::Map(map) => map,
            FilterInput::Token(token) => codec::decode(Some(&token)),
        };
        self.save_data(&raw);
        self.load_data();
        self
    }

    /// Runs the action of the clicked submit button
    pub fn dispatch(
        &mut self,
        action: FilterAction,
        request: &mut dyn RequestContext,
    ) -> Result<FilterMap, FilterFormError> {
        match action {
            FilterAction::Filter => {
                self.form.validate().map_err(FilterFormError::Validation)?;
                self.process_submit(request)
            }
            FilterAction::Reset => self.process_reset(request),
        }
    }

    /// Stores the submitted form values and notifies the `on_filter` listeners
    pub fn process_submit(
        &mut self,
        request: &mut dyn RequestContext,
    ) -> Result<FilterMap, FilterFormError> {
        let values = self.form.values();
        self.save_data(&values);

        let data = self.get_data();
        tracing::info!(control = %self.name, token = ?self.data, "Filter submitted");
        self.notify(&self.on_filter, &data)?;

        self.finish(request)?;
        Ok(data)
    }

    /// Clears the form and the persisted token, notifies the `on_reset` listeners
    pub fn process_reset(
        &mut self,
        request: &mut dyn RequestContext,
    ) -> Result<FilterMap, FilterFormError> {
        self.form.set_values(&FilterMap::new(), true);
        self.data = None;

        let data = self.get_data();
        tracing::info!(control = %self.name, "Filter reset");
        self.notify(&self.on_reset, &data)?;

        self.finish(request)?;
        Ok(data)
    }

    /// CSS classes of the form root element
    pub fn form_classes(&self) -> Vec<String> {
        let mut classes = vec![lcfirst(Self::TYPE_NAME), lcfirst(&self.name)];
        if self.ajax_request {
            classes.push("ajax".to_string());
        }
        classes
    }

    pub fn render(&mut self, template: &mut dyn TemplateEngine) -> Result<String, FilterFormError> {
        self.load_data();
        for class in self.form_classes() {
            self.form.add_class(&class);
        }

        let form = self.form.render();
        template.bind("_form", form.clone());
        template.bind("form", form);
        template.set_file(&self.template_file);
        template.render()
    }

    fn save_data(&mut self, raw: &FilterMap) {
        let filter = normalizer::prepare_for_storage(
            raw,
            &self.default_values,
            self.data_filter.as_deref(),
        );
        self.data = codec::encode(&filter);
        tracing::debug!(control = %self.name, token = ?self.data, "Filter data saved");
    }

    /// Pushes stored values into the form, fields without a value keep their own default
    fn load_data(&mut self) {
        for (key, value) in self.get_data() {
            match value {
                Some(value) if !value.is_empty() && self.form.has_field(&key) => {
                    self.form.set_value(&key, Some(&value));
                }
                _ => {}
            }
        }
    }

    fn notify(&self, listeners: &[Listener<F>], data: &FilterMap) -> Result<(), FilterFormError> {
        for listener in listeners {
            listener(self, data).map_err(|e| {
                tracing::warn!(control = %self.name, "Filter listener failed: {:#}", e);
                FilterFormError::Listener(e)
            })?;
        }
        Ok(())
    }

    fn finish(&self, request: &mut dyn RequestContext) -> Result<(), FilterFormError> {
        if !request.is_ajax() {
            request.redirect_this()?;
        }
        Ok(())
    }
}

fn lcfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
