pub mod a11y;
pub mod animation;
pub mod config;
pub mod kernel;
pub mod monitor;
pub mod native;
pub mod surface;

pub use config::LumenConfig;
pub use kernel::error::MonitorError;
pub use surface::{LatestResults, MonitoringSurface, SurfaceHost};
