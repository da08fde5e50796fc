use thiserror::Error;

/// Runtime failures of the monitoring core.
/// None of these are fatal to the host; callers degrade and continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// A bounded performance test is already in flight. The active run is untouched.
    #[error("performance test already running")]
    AlreadyRunning,

    /// The host exposes no memory introspection.
    #[error("memory telemetry is not supported on this host")]
    TelemetryUnavailable,

    /// `stop_test` was requested before the run reached its duration.
    #[error("performance test cancelled")]
    Cancelled,

    /// The frame clock ran dry before the run reached its duration.
    #[error("frame clock stopped before the test completed")]
    ClockStopped,
}
