pub mod connection;
pub mod error;
pub mod load;
pub mod run_settings;

pub use connection::{ConnectionConfig, Protocol};
pub use error::ConfigError;
pub use load::{
    load_calibration_request, load_connection_config, load_run_configuration, load_run_settings,
    run_configuration_path,
};
pub use run_settings::{LoadTimeWindows, RunSettings};
