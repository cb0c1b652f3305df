//! Process lifecycle.

mod state;

pub use state::setup_shutdown_handler;
