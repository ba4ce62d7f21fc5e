use folio_content::{
    Binding, ContentDocument, Draft, FieldEditor, FieldType, FieldValue, Notification, Overlay,
    Resolved, ToolbarButton,
};
use thiserror::Error;

/// Errors that can occur while rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Could not serialize value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for page rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Page title
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            title: "Portfolio".to_string(),
        }
    }
}

pub(crate) struct Context {
    options: RenderOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    pub(crate) fn new(options: RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    pub(crate) fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub(crate) fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    /// Add a multi-line fragment, one indented line at a time
    pub(crate) fn add_block(&mut self, fragment: &str) {
        for line in fragment.lines().filter(|l| !l.trim().is_empty()) {
            self.add_line(line);
        }
    }

    fn add_indent(&mut self) {
        let indent = self.options.indent.clone();
        for _ in 0..self.depth {
            self.add(&indent);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub(crate) fn get_output(self) -> String {
        self.buffer
    }
}

/// Display view of a value
pub fn render_value(value: &FieldValue, binding: &Binding) -> Result<String, RenderError> {
    let html = match value {
        FieldValue::Text(text) => {
            let escaped = escape_html(text);
            if binding.multiline {
                escaped.replace('\n', "<br>")
            } else {
                escaped
            }
        }

        // Trusted markup from the site owner, injected as-is
        FieldValue::RichText(html) => html.clone(),

        FieldValue::Image(src) => format!(
            "<img src=\"{}\" alt=\"{}\" />",
            escape_html(src),
            escape_html(&binding.field_path)
        ),

        FieldValue::List(items) => {
            let tag = if binding.ordered { "ol" } else { "ul" };
            let mut out = format!("<{}>", tag);
            for item in items {
                out.push_str(&format!("<li>{}</li>", escape_html(item)));
            }
            out.push_str(&format!("</{}>", tag));
            out
        }

        FieldValue::Link(link) => format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&link.url),
            escape_html(&link.label)
        ),

        FieldValue::Number(_) => escape_html(&value.to_string()),

        FieldValue::Object(json) => format!(
            "<pre class=\"folio-json\">{}</pre>",
            escape_html(&serde_json::to_string_pretty(json)?)
        ),
    };

    Ok(html)
}

/// A binding as the current viewer sees it. In edit mode the view is
/// wrapped in a clickable marker carrying the binding's address.
pub fn render_binding(binding: &Binding, overlay: &Overlay) -> Result<String, RenderError> {
    render_binding_in(binding, overlay.view(), binding.is_editable(overlay.gate()))
}

pub(crate) fn render_binding_in(
    binding: &Binding,
    document: &ContentDocument,
    editable: bool,
) -> Result<String, RenderError> {
    let inner = match binding.resolve(document) {
        Resolved::Stored(value) | Resolved::Default(value) => render_value(&value, binding)?,
        Resolved::Fallback(markup) => markup,
        Resolved::Empty => String::new(),
    };

    if !editable {
        return Ok(inner);
    }

    let tag = match binding.field_type {
        FieldType::List | FieldType::Object | FieldType::RichText => "div",
        _ => "span",
    };

    Ok(format!(
        "<{tag} class=\"folio-editable\" data-section=\"{}\" data-field=\"{}\" data-type=\"{}\">{}</{tag}>",
        escape_html(&binding.section),
        escape_html(&binding.field_path),
        binding.field_type,
        inner,
        tag = tag
    ))
}

/// Edit form for a field being edited, empty when in display state
pub fn render_editor(editor: &FieldEditor) -> String {
    let Some(draft) = editor.draft() else {
        return String::new();
    };
    let binding = editor.binding();

    let mut out = format!(
        "<form class=\"folio-editor\" data-section=\"{}\" data-field=\"{}\" data-type=\"{}\">",
        escape_html(&binding.section),
        escape_html(&binding.field_path),
        binding.field_type
    );

    match draft {
        Draft::Text(text) if binding.multiline => {
            out.push_str(&format!("<textarea name=\"value\">{}</textarea>", escape_html(text)));
        }
        Draft::Text(text) => {
            out.push_str(&format!(
                "<input type=\"text\" name=\"value\" value=\"{}\" />",
                escape_html(text)
            ));
        }
        Draft::RichText(html) => {
            out.push_str(&format!(
                "<textarea name=\"value\" class=\"folio-html\">{}</textarea>",
                escape_html(html)
            ));
        }
        Draft::Image(image) => {
            out.push_str(&format!(
                "<input type=\"url\" name=\"url\" value=\"{}\" />",
                escape_html(&image.source)
            ));
            out.push_str("<input type=\"file\" name=\"file\" accept=\"image/*\" />");
            if !image.source.is_empty() {
                out.push_str(&format!(
                    "<img class=\"folio-preview\" src=\"{}\" alt=\"\" />",
                    escape_html(&image.source)
                ));
            }
        }
        Draft::List(list) => {
            for (i, item) in list.items.iter().enumerate() {
                out.push_str(&format!(
                    "<div class=\"folio-item\"><input type=\"text\" name=\"items[{i}]\" value=\"{}\" /><button type=\"button\" data-action=\"removeItem\" data-index=\"{i}\">Remove</button></div>",
                    escape_html(item),
                    i = i
                ));
            }
            out.push_str("<button type=\"button\" data-action=\"addItem\">Add item</button>");
        }
        Draft::Link { label, url } => {
            out.push_str(&format!(
                "<input type=\"text\" name=\"label\" value=\"{}\" />",
                escape_html(label)
            ));
            out.push_str(&format!(
                "<input type=\"url\" name=\"url\" value=\"{}\" />",
                escape_html(url)
            ));
        }
        Draft::Number(text) => {
            out.push_str(&format!(
                "<input type=\"number\" name=\"value\" value=\"{}\" />",
                escape_html(text)
            ));
        }
        Draft::Json(json) => {
            out.push_str(&format!(
                "<textarea name=\"json\" class=\"folio-json\">{}</textarea>",
                escape_html(json.text())
            ));
            out.push_str("<button type=\"button\" data-action=\"applyJson\">Apply</button>");
            if let Some(error) = json.error() {
                out.push_str(&format!(
                    "<p class=\"folio-json-error\">{}</p>",
                    escape_html(error)
                ));
            }
        }
    }

    if let Some(error) = editor.error() {
        out.push_str(&format!("<p class=\"folio-error\">{}</p>", escape_html(error)));
    }

    out.push_str("<button type=\"submit\" data-action=\"commitField\">Save</button>");
    out.push_str("<button type=\"button\" data-action=\"cancel\">Cancel</button>");
    out.push_str("</form>");
    out
}

/// Toolbar for the current session, empty for visitors
pub fn render_toolbar(overlay: &Overlay) -> String {
    let buttons = overlay.toolbar();
    if buttons.is_empty() {
        return String::new();
    }

    let mut out = String::from("<nav class=\"folio-toolbar\">");
    if overlay.store().is_dirty() {
        out.push_str("<span class=\"folio-dirty\">Unsaved changes</span>");
    }
    for button in buttons {
        if button == ToolbarButton::Import {
            out.push_str("<input type=\"file\" name=\"import\" accept=\"application/json,.json\" hidden />");
        }
        out.push_str(&format!(
            "<button type=\"button\" data-action=\"{}\">{}</button>",
            button.action_name(),
            button.label()
        ));
    }
    out.push_str("</nav>");
    out
}

pub fn render_login_dialog(error: Option<&str>) -> String {
    let mut out = String::from(
        "<dialog class=\"folio-login\"><form method=\"dialog\" data-action=\"login\">",
    );
    out.push_str("<label>Email <input type=\"email\" name=\"email\" required /></label>");
    out.push_str("<label>Password <input type=\"password\" name=\"password\" required /></label>");
    if let Some(error) = error {
        out.push_str(&format!("<p class=\"folio-error\">{}</p>", escape_html(error)));
    }
    out.push_str("<button type=\"submit\">Sign in</button></form></dialog>");
    out
}

pub fn render_notification(notification: &Notification) -> String {
    match notification {
        Notification::Success { message } => format!(
            "<div class=\"folio-notice folio-success\" role=\"status\">{}</div>",
            escape_html(message)
        ),
        Notification::Error { message } => format!(
            "<div class=\"folio-notice folio-failure\" role=\"alert\">{}</div>",
            escape_html(message)
        ),
        Notification::Download { file } => format!(
            "<div class=\"folio-notice folio-success\" role=\"status\">Exported {}</div>",
            escape_html(&file.file_name)
        ),
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
