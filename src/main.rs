use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lumen::kernel::clock::IntervalFrameClock;
use lumen::{LumenConfig, MonitoringSurface, SurfaceHost};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = match env::args().nth(1).or_else(|| env::var("LUMEN_CONFIG").ok()) {
        Some(path) => LumenConfig::load(&path)?,
        None => LumenConfig::default(),
    };
    info!("Lumen monitor booting...");

    let frame_interval = Duration::from_millis(config.tester.frame_interval_ms.max(1));
    let host = SurfaceHost::native(&config.host);
    let mut surface = MonitoringSurface::new(config, host);
    surface.mount(IntervalFrameClock::new(frame_interval));

    if surface.battery().should_optimize_for_battery() {
        warn!(
            "Battery low ({:.0}%) and unplugged; animations should be trimmed",
            surface.battery().battery_level() * 100.0
        );
    }

    let animation = surface.animation_config();
    println!("{}", serde_json::to_string_pretty(&animation)?);

    match surface
        .run_performance_test(IntervalFrameClock::new(frame_interval))
        .await
    {
        Ok(summary) => {
            info!(
                "Performance test finished: avg {} FPS, grade {:?}",
                summary.fps.average, summary.performance
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Err(e) => warn!("Performance test did not complete: {}", e),
    }

    let audit = surface.run_accessibility_audit();
    println!("{}", serde_json::to_string_pretty(&audit)?);

    if let Ok(report) = surface.memory_report() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    surface.unmount();
    println!("{}", serde_json::to_string_pretty(&surface.telemetry_snapshot())?);
    Ok(())
}
