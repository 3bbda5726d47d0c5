//! Embedded static resources.
//!
//! Currently a single asset: the live-reload client script injected into
//! HTML responses by the dev server.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

// ============================================================================
// Reload client script
// ============================================================================

/// Variables for the reload client script.
pub struct ReloadVars {
    pub ws_port: u16,
}

impl TemplateVars for ReloadVars {
    fn apply(&self, content: &str) -> String {
        content.replace("__WS_PORT__", &self.ws_port.to_string())
    }
}

/// Live-reload client, injected inline before `</body>`.
pub const RELOAD_JS: Template<ReloadVars> = Template::new(include_str!("reload.js"));

/// Render the reload client as an inline script tag.
pub fn reload_script_tag(ws_port: u16) -> String {
    format!("<script>\n{}</script>", RELOAD_JS.render(&ReloadVars { ws_port }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_script_port_substitution() {
        let js = RELOAD_JS.render(&ReloadVars { ws_port: 35729 });
        assert!(js.contains(":35729"));
        assert!(!js.contains("__WS_PORT__"));
    }

    #[test]
    fn test_reload_script_tag_wrapped() {
        let tag = reload_script_tag(4000);
        assert!(tag.starts_with("<script>"));
        assert!(tag.ends_with("</script>"));
    }
}
