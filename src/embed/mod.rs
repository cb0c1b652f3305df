//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server bootstrap page (index.html)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{INDEX_HTML, IndexVars};
//!
//! let html = INDEX_HTML.render(&IndexVars {
//!     title: "Main.elm".into(),
//!     host: "localhost:8080".into(),
//!     last_mod: "17979cfe362a0000".into(),
//!     script: compiled_js,
//! });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::html::{escape, escape_inline_script};

    /// Variables for index.html template.
    #[derive(Debug, Clone, Default)]
    pub struct IndexVars {
        /// Page title (the watched file name)
        pub title: String,
        /// `Host` the browser connected to; blank falls back to `location.host`
        pub host: String,
        /// Hex nanosecond stamp of the inlined build
        pub last_mod: String,
        /// Compiled program, or error text
        pub script: String,
    }

    impl TemplateVars for IndexVars {
        fn apply(&self, content: &str) -> String {
            // Script last: it is arbitrary text and may contain placeholders.
            content
                .replace("__LIVECODE_TITLE__", &escape(&self.title))
                .replace("__LIVECODE_HOST__", &sanitize_host(&self.host))
                .replace("__LIVECODE_LAST_MOD__", &sanitize_hex(&self.last_mod))
                .replace("__LIVECODE_SCRIPT__", &escape_inline_script(&self.script))
        }
    }

    /// Bootstrap page: inlined build plus the WebSocket client.
    pub const INDEX_HTML: Template<IndexVars> = Template::new(include_str!("serve/index.html"));

    /// Host is spliced into a JS string literal; anything outside
    /// `host[:port]` syntax is dropped.
    fn sanitize_host(host: &str) -> String {
        let valid = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'));
        if valid { host.to_string() } else { String::new() }
    }

    fn sanitize_hex(stamp: &str) -> String {
        if !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_hexdigit()) {
            stamp.to_string()
        } else {
            "0".to_string()
        }
    }

}
