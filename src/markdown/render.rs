//! Rendering
//!
//! Every node kind has one HTML template (see [`templates`]). Templates are
//! compiled once by [`template`] and evaluated by the [`Renderer`] as it walks
//! the tree.

pub mod escape;
pub mod html;
pub mod math;
pub mod template;
pub mod templates;

pub use escape::{escape, mangle};
pub use html::{wrap_document, Renderer};
pub use math::{MathCache, MathEngine, MathError};
pub use template::{Fields, Template, TemplateError};
pub use templates::template_for;
