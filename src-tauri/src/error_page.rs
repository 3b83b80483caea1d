use crate::{escape_hatches::ESCAPE_HATCHES, window_host::WindowHost};

pub(crate) const STARTUP_ERROR_TITLE: &str = "Unable to start";
pub(crate) const LOAD_ERROR_TITLE: &str = "Load error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorTarget {
    Splash,
    Main,
    Nowhere,
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_hatch_hint() -> String {
    let bindings = ESCAPE_HATCHES
        .iter()
        .map(|hatch| format!("<b>{}</b> for {}", hatch.key_label(), hatch.purpose()))
        .collect::<Vec<_>>();
    format!("Press {}.", bindings.join(", "))
}

/// Self-contained fallback screen: inline styles only, nothing fetched.
pub(crate) fn render_error_document(title: &str, message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>",
            "<body style=\"margin:0;background:#111;color:#fff;font-family:sans-serif;",
            "display:flex;align-items:center;justify-content:center;height:100vh;text-align:center\">",
            "<div><h1>{title}</h1><p style=\"max-width:700px\">{message}</p><p>{hint}</p></div>",
            "</body></html>"
        ),
        title = escape_html(title),
        message = escape_html(message),
        hint = escape_hatch_hint(),
    )
}

pub(crate) fn document_data_url(html: &str) -> String {
    format!("data:text/html;charset=utf-8,{}", urlencoding::encode(html))
}

/// Replaces the content of whichever window exists; never opens a new one.
pub(crate) fn present_error<H, F>(
    host: &H,
    splash: Option<&H::Window>,
    main: Option<&H::Window>,
    message: &str,
    log: F,
) -> ErrorTarget
where
    H: WindowHost,
    F: Fn(&str),
{
    let (target, window, title) = match (main, splash) {
        (Some(main), _) => (ErrorTarget::Main, main, LOAD_ERROR_TITLE),
        (None, Some(splash)) => (ErrorTarget::Splash, splash, STARTUP_ERROR_TITLE),
        (None, None) => {
            log(&format!("no window available to show error: {message}"));
            return ErrorTarget::Nowhere;
        }
    };

    if host.is_destroyed(window) {
        log(&format!("target window already destroyed, error not shown: {message}"));
        return ErrorTarget::Nowhere;
    }

    if let Err(error) = host.load_document(window, &render_error_document(title, message)) {
        log(&format!("failed to render error screen: {error}"));
    }
    target
}
