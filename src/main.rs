use anyhow::Result;
use cpu_probe::config::CONFIG;
use cpu_probe::target_list::TargetList;
use cpu_probe::Probe;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing for nicer output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("CPU Probe 0.1.0 is Starting");

    let now = Instant::now();
    let targets = TargetList::from_csv(&CONFIG.target_list)?;
    let probe = Probe::from_config();
    let readings = targets.poll_all(&probe).await;
    let elapsed = now.elapsed();
    info!(
        "Polled {} devices in {:.2} seconds. Retrieved {} readings.",
        targets.targets.len(),
        elapsed.as_secs_f64(),
        readings.len()
    );

    for reading in readings.iter() {
        println!(
            "{:<16} {:<18} {:>3}%",
            reading.connection.snmp_address, reading.vendor, reading.cpu
        );
    }

    Ok(())
}
