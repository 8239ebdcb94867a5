//! Lifecycle hooks
//!
//! Components that own external resources (the document store client) take
//! part in start-up and shutdown through these hooks.
//!
//! ```text
//! 1. Configuration loading
//! 2. DbContext::connect
//! 3. Container + module registration
//! 4. OnModuleInit (registration order)     <- store ping
//! 5. Server start
//!    [running]
//! 6. Shutdown signal (SIGTERM/SIGINT)
//! 7. OnModuleDestroy (reverse order)       <- client close
//! ```

mod application;
mod error;
mod manager;
mod shutdown;
mod traits;

pub use application::{Application, ApplicationBuilder};
pub use error::{LifecycleError, Result};
pub use manager::LifecycleManager;
pub use shutdown::shutdown_signal;
pub use traits::{OnModuleDestroy, OnModuleInit};
