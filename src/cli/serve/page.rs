//! Bootstrap page for `GET /`.

use std::io::Write;

use anyhow::Result;

use super::request::RequestHead;
use super::response;
use crate::embed::serve::{INDEX_HTML, IndexVars};
use crate::freshness::ModTime;
use crate::reload::poller::{BuildResult, ChangePoller};

/// Build from scratch and render the page around the result.
///
/// The embedded `lastMod` is the stamp of the inlined build, so the client's
/// session starts in sync and only pushes later changes. A rejected build
/// inlines nothing; a filesystem error inlines its text with stamp `0`.
pub fn render_bootstrap(poller: &ChangePoller, title: &str, host: &str) -> String {
    let poll = poller.check_and_build(ModTime::ZERO);

    let (script, last_mod) = match poll.result {
        Ok(BuildResult::Artifact(bytes)) => (
            String::from_utf8_lossy(&bytes).into_owned(),
            poll.mod_time,
        ),
        Ok(BuildResult::Diagnostic(_) | BuildResult::Unchanged) => (String::new(), poll.mod_time),
        Err(e) => (e.to_string(), ModTime::ZERO),
    };

    INDEX_HTML.render(&IndexVars {
        title: title.to_string(),
        host: host.to_string(),
        last_mod: last_mod.to_hex(),
        script,
    })
}

/// Serve the page. Only `GET` is allowed.
pub fn serve_home<W: Write>(
    out: &mut W,
    head: &RequestHead,
    poller: &ChangePoller,
    title: &str,
) -> Result<()> {
    if head.method != "GET" {
        return response::respond_method_not_allowed(out);
    }

    let host = head.header("host").unwrap_or_default();
    let body = render_bootstrap(poller, title, host);
    response::respond_html(out, body)
}
