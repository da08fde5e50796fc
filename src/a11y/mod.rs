pub mod color;
pub mod auditor;

pub use color::*;
pub use auditor::*;
