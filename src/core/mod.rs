//! Core infrastructure module for Forest Lab.
//!
//! - [`types`]: task, run-kind and hyperparameter enumerations
//! - [`constants`]: defaults and mock-training bounds
//! - [`error`]: error types and the crate [`Result`] alias

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{DatasetError, ForestLabError, Result};
pub use types::*;

use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static CORE_INIT: Once = Once::new();
static CORE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize logging for the library. Safe to call repeatedly.
pub fn initialize_core() -> Result<()> {
    CORE_INIT.call_once(|| {
        initialize_logging();
        CORE_INITIALIZED.store(true, Ordering::SeqCst);
        log::info!("Forest Lab {} initialized", FOREST_LAB_VERSION);
    });
    Ok(())
}

/// Whether [`initialize_core`] has run.
pub fn is_core_initialized() -> bool {
    CORE_INITIALIZED.load(Ordering::SeqCst)
}

fn initialize_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // Another logger may already be installed by the host application.
    let _ = env_logger::Builder::from_env(env).try_init();
}
