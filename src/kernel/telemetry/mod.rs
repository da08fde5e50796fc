//! Advisory Telemetry
//!
//! # READ-ONLY INVARIANT
//! Telemetry is a side-effect log of advisory conditions (low FPS, leak
//! suspicion, rejected runs). It is **never** read by the degradation logic
//! and never interrupts sampling.
//!
//! # LOCALITY INVARIANT
//! Events stay in process memory. Nothing here is transmitted or persisted.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::*;
pub use metrics::*;
pub use recorder::*;
