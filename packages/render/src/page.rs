//! Whole-page rendering: the portfolio's sections with their bindings,
//! plus the admin overlay when someone is signed in.

use crate::renderer::{
    escape_html, render_binding_in, render_login_dialog, render_toolbar, Context, RenderError,
    RenderOptions,
};
use folio_content::{
    Binding, ContentDocument, FeatureGate, FieldType, FieldValue, Link, Overlay, SectionVisibility,
};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PageSection {
    pub id: String,
    pub heading: String,
    pub bindings: Vec<Binding>,
    /// Section renders for visitors only while this feature is enabled
    pub feature: Option<FeatureGate>,
}

impl PageSection {
    pub fn new(id: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            heading: heading.into(),
            bindings: Vec::new(),
            feature: None,
        }
    }

    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn gated_by(mut self, feature: FeatureGate) -> Self {
        self.feature = Some(feature);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub sections: Vec<PageSection>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: PageSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Every binding on the page, in render order
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.sections.iter().flat_map(|s| s.bindings.iter())
    }

    pub fn find_binding(&self, full_path: &str) -> Option<&Binding> {
        self.bindings().find(|b| b.full_path() == full_path)
    }
}

/// The stock portfolio layout
pub fn portfolio_page() -> Page {
    Page::new()
        .section(
            PageSection::new("about", "About")
                .bind(
                    Binding::text("about", "title")
                        .with_default(FieldValue::Text("Hello, I build things".to_string())),
                )
                .bind(
                    Binding::text("about", "bio")
                        .multiline()
                        .with_fallback("<p>Bio coming soon.</p>"),
                )
                .bind(Binding::new("about", "photo", FieldType::Image))
                .bind(
                    Binding::new("about", "yearsExperience", FieldType::Number)
                        .with_default(FieldValue::Number(1.0)),
                ),
        )
        .section(
            PageSection::new("skills", "Skills").bind(
                Binding::new("skills", "items", FieldType::List)
                    .with_default(FieldValue::List(vec!["Rust".to_string()])),
            ),
        )
        .section(
            PageSection::new("projects", "Projects").bind(
                Binding::new("projects", "items", FieldType::Object)
                    .with_default(FieldValue::Object(json!([]))),
            ),
        )
        .section(
            PageSection::new("services", "Services")
                .bind(Binding::new("services", "intro", FieldType::RichText))
                .bind(Binding::new("services", "steps", FieldType::List).ordered()),
        )
        .section(
            PageSection::new("contact", "Contact")
                .bind(Binding::text("contact", "email").with_validator(|value| match value {
                    FieldValue::Text(email) if email.contains('@') => Ok(()),
                    _ => Err("Enter a valid email address".to_string()),
                }))
                .bind(
                    Binding::new("contact", "linkedin", FieldType::Link)
                        .with_default(FieldValue::Link(Link::new("LinkedIn", ""))),
                ),
        )
        .section(
            PageSection::new("whatsapp", "WhatsApp")
                .bind(Binding::new("whatsapp", "chat", FieldType::Link))
                .gated_by(FeatureGate::new("whatsapp", true)),
        )
}

/// What one render pass sees
struct PageView<'a> {
    document: &'a ContentDocument,
    edit_mode: bool,
    signed_in: bool,
    toolbar: String,
}

/// Render a complete HTML document for the overlay's own session
pub fn render_page(page: &Page, overlay: &Overlay, options: RenderOptions) -> Result<String, RenderError> {
    let view = PageView {
        document: overlay.view(),
        edit_mode: overlay.gate().is_edit_mode(),
        signed_in: overlay.gate().is_admin(),
        toolbar: render_toolbar(overlay),
    };
    render_view(page, &view, options)
}

/// Render the last saved content as an anonymous visitor sees it,
/// whatever state the admin session is in
pub fn render_published(page: &Page, overlay: &Overlay, options: RenderOptions) -> Result<String, RenderError> {
    let view = PageView {
        document: overlay.store().published(),
        edit_mode: false,
        signed_in: false,
        toolbar: String::new(),
    };
    render_view(page, &view, options)
}

fn render_view(page: &Page, view: &PageView<'_>, options: RenderOptions) -> Result<String, RenderError> {
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let title = format!("<title>{}</title>", escape_html(&ctx.options().title));
    ctx.add_line(&title);
    ctx.dedent();
    ctx.add_line("</head>");

    let body = if view.edit_mode {
        "<body class=\"folio-edit-mode\">"
    } else {
        "<body>"
    };
    ctx.add_line(body);
    ctx.indent();

    if !view.toolbar.is_empty() {
        ctx.add_line(&view.toolbar);
    }

    for section in &page.sections {
        render_section(&mut ctx, section, view)?;
    }

    if !view.signed_in {
        ctx.add_line(&render_login_dialog(None));
    }

    ctx.dedent();
    ctx.add_line("</body>");
    ctx.dedent();
    ctx.add_line("</html>");

    Ok(ctx.get_output())
}

fn render_section(ctx: &mut Context, section: &PageSection, view: &PageView<'_>) -> Result<(), RenderError> {
    // A disabled feature's section stays on screen while editing so it
    // can be switched back on
    let feature = section
        .feature
        .as_ref()
        .map(|gate| (gate, gate.is_enabled(view.document)));
    if let Some((gate, false)) = feature {
        if !view.edit_mode {
            debug!(section = %section.id, feature = %gate.feature, "Feature disabled");
            return Ok(());
        }
    }

    let visibility = SectionVisibility::of(view.document, &section.id);
    if !visibility.should_render(view.edit_mode) {
        return Ok(());
    }

    let dimmed = visibility == SectionVisibility::Hidden || matches!(feature, Some((_, false)));
    let class = if dimmed { " class=\"folio-hidden\"" } else { "" };
    ctx.add_line(&format!(
        "<section id=\"{}\"{}>",
        escape_html(&section.id),
        class
    ));
    ctx.indent();

    if view.edit_mode {
        ctx.add_line(&section_controls(&section.id, visibility, feature));
    }

    ctx.add_line(&format!("<h2>{}</h2>", escape_html(&section.heading)));
    for binding in &section.bindings {
        let html = render_binding_in(binding, view.document, view.edit_mode)?;
        if html.is_empty() {
            continue;
        }
        ctx.add_line("<div class=\"folio-field\">");
        ctx.indent();
        ctx.add_block(&html);
        ctx.dedent();
        ctx.add_line("</div>");
    }

    ctx.dedent();
    ctx.add_line("</section>");
    Ok(())
}

fn section_controls(
    section: &str,
    visibility: SectionVisibility,
    feature: Option<(&FeatureGate, bool)>,
) -> String {
    let (visible, label) = match visibility {
        SectionVisibility::Hidden => ("true", "Show"),
        _ => ("false", "Hide"),
    };
    let toggle = match feature {
        Some((gate, enabled)) => format!(
            "<button type=\"button\" data-action=\"setFeature\" data-feature=\"{feat}\" data-enabled=\"{}\">{} {feat}</button>",
            !enabled,
            if enabled { "Disable" } else { "Enable" },
            feat = escape_html(&gate.feature)
        ),
        None => String::new(),
    };
    format!(
        "<div class=\"folio-section-controls\"><button type=\"button\" data-action=\"setSectionVisibility\" data-section=\"{sec}\" data-visible=\"{}\">{}</button><button type=\"button\" data-action=\"removeSection\" data-section=\"{sec}\">Remove</button>{}</div>",
        visible,
        label,
        toggle,
        sec = escape_html(section)
    )
}
