//! Filter form control: a form whose submitted values are normalized, encoded into a
//! query-string token and carried in the page's persistent state across requests.

pub mod codec;
pub mod control;
pub mod error;
pub mod host;
pub mod html_form;
pub mod normalizer;
pub mod template;
pub mod web;

pub use control::{FilterFormControl, FilterInput, Listener};
pub use error::FilterFormError;
pub use host::{FilterForm, PersistentState, RequestContext, TemplateEngine};
pub use html_form::HtmlForm;
pub use template::FileTemplate;
pub use web::{HttpRequestContext, QueryState};
