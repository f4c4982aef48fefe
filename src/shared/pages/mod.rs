//! Page template management module.
//!
//! Templates live in `templates/pages/` (configurable via `PAGES_DIR`) and use
//! Jinja2 syntax.

pub mod engine;

pub use engine::{PageError, PageRenderer};

use minijinja::context;

/// The claim form, also used as the acknowledgment page
pub const FORM_PAGE: &str = "form.html";

/// Every page the service renders
pub const ALL_PAGES: &[&str] = &[FORM_PAGE];

/// Render the claim form; `success` switches it to the acknowledgment view.
pub fn render_form_page(renderer: &PageRenderer, success: bool) -> Result<String, PageError> {
    renderer.render(FORM_PAGE, context! { success => success })
}
