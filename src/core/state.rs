//! Process-wide shutdown.
//!
//! Sessions hold no resources worth flushing: the compiler writes the only
//! file, and open sockets close with the process. Ctrl+C therefore just
//! announces itself and exits; the accept loop never has to notice.

/// Setup the global Ctrl+C handler. Call once at program start
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        crate::log!("serve"; "shutting down...");
        std::process::exit(0);
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
