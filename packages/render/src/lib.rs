//! # Folio Render
//!
//! Turns bindings into HTML: a display view for visitors, an inline
//! editor for the admin in edit mode, plus the overlay toolbar, login
//! dialog and page shell.

mod page;
mod renderer;


pub use page::{portfolio_page, render_page, render_published, Page, PageSection};
pub use renderer::{
    escape_html, render_binding, render_editor, render_login_dialog, render_notification,
    render_toolbar, render_value, RenderError, RenderOptions,
};
