//! Reload script injection for served HTML.

use crate::embed::reload_script_tag;

/// Maybe inject the reload script if content is HTML and a reload server runs
pub fn maybe_inject_reload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(port)) => inject_reload_script(&body, port),
        _ => body,
    }
}

/// Inject the reload script before the `</body>` tag
fn inject_reload_script(content: &[u8], ws_port: u16) -> Vec<u8> {
    let script = reload_script_tag(ws_port);
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    // Reverse search for </body> using byte windows
    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + script_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    // No </body> found, append to end (browsers handle this gracefully)
    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(script_bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = maybe_inject_reload(html, HTML, Some(35729));
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("<script>"));
        assert!(text.find("<script>").unwrap() < text.find("</body>").unwrap());
        assert!(text.contains(":35729"));
    }

    #[test]
    fn test_inject_appends_without_body_tag() {
        let html = b"<p>fragment</p>".to_vec();
        let out = maybe_inject_reload(html, HTML, Some(35729));
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("<p>fragment</p>"));
        assert!(text.contains("<script>"));
    }

    #[test]
    fn test_no_injection_for_non_html() {
        let css = b"body { color: red }".to_vec();
        let out = maybe_inject_reload(css.clone(), CSS, Some(35729));
        assert_eq!(out, css);
    }

    #[test]
    fn test_no_injection_without_ws_port() {
        let html = b"<html><body></body></html>".to_vec();
        let out = maybe_inject_reload(html.clone(), HTML, None);
        assert_eq!(out, html);
    }

    #[test]
    fn test_inject_case_insensitive_body_tag() {
        let html = b"<HTML><BODY></BODY></HTML>".to_vec();
        let out = maybe_inject_reload(html, HTML, Some(4000));
        let text = String::from_utf8(out).unwrap();
        assert!(text.find("<script>").unwrap() < text.find("</BODY>").unwrap());
    }
}
