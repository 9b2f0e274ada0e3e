pub mod adapters; // Endpoint adapters: evolutions, exams, prescriptions
pub mod config;
pub mod envelope; // {success, prontuario, data | error}
pub mod extraction; // Raw payload → canonical records
pub mod models;
pub mod session; // Cookie session against the HICD backend

pub use adapters::{
    fetch_evolutions, fetch_exams, fetch_prescriptions, run_adapter, AdapterError,
    PatientRequest, Resource, ResourceAdapter,
};
pub use config::HicdConfig;
pub use envelope::Envelope;
pub use session::{Credentials, SessionClient, SessionError, SessionState};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default filter.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} tracing initialised", config::APP_NAME, config::APP_VERSION);
    }
}
