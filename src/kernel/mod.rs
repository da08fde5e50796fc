pub mod clock;
pub mod error;
pub mod fps;
pub mod history;
pub mod host;
pub mod telemetry;
pub mod time;
