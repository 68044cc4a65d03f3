mod config;
mod logging;
pub use config::AppConfig;
pub use logging::init_tracing;
