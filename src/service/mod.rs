pub mod data_loop;
pub mod state;

pub use data_loop::{MonitorConfig, MonitoringLoop};
pub use state::{SharedState, create_shared_state};
