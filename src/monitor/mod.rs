pub mod types;
pub mod performance;
pub mod tester;
pub mod leak;
pub mod battery;

pub use types::*;
pub use performance::*;
pub use tester::*;
pub use leak::*;
pub use battery::*;
