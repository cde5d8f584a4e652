pub mod api_observability;
pub mod app_config;
pub mod catalog;
pub mod dispatcher;

// Re-export main types for easier imports
pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use catalog::CatalogConfig;
pub use dispatcher::{BusyPolicy, DispatcherConfig};
