use pothole_link::transport::MockTransport;
use pothole_link::{Bridge, LinkConfig, ListenerConfig};
use std::time::Duration;
use tracing::{error, info, Level};

/// Runs the bridge against real hardware, or against a scripted controller
/// when started with `--dry-run`.
///
/// ```plain
/// cargo run --example bridge -- [config.json] [--dry-run]
/// ```
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => match LinkConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => LinkConfig::default(),
    };

    info!("Configuration:");
    info!("- Transport: {:?}", config.transport);
    info!("- SPI: {} Hz, {} bits, mode {}", config.spi.speed_hz, config.spi.bits_per_word, config.spi.mode);
    info!("- Poll interval: {:?}", config.poll_interval);

    if dry_run {
        let mut controller = MockTransport::new();
        controller
            .push_idle(5)
            .push_bytes(b"@TS,12")
            .push_bytes(b"@TS,0000001234#")
            .stay_open();
        run(Bridge::new(controller, ListenerConfig::from(&config))).await;
    } else {
        match Bridge::open(&config) {
            Ok(bridge) => run(bridge).await,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run<T: pothole_link::Transport + 'static>(bridge: Bridge<T>) {
    let listener = bridge.spawn_listener();

    // Example send, stamped with whatever time we have so far
    tokio::time::sleep(Duration::from_millis(200)).await;
    if let Err(e) = bridge.report_detection(12.3, 1.7) {
        error!("Report failed: {}", e);
    }

    info!("Running. Press CTRL+C to exit.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL+C: {}", e);
    }

    bridge.shutdown();
    match listener.await {
        Ok(Ok(exit)) => info!("Listener exited: {:?}", exit),
        Ok(Err(e)) => error!("Listener failed: {}", e),
        Err(e) => error!("Listener task failed: {}", e),
    }

    let stats = bridge.stats();
    info!("Clock: {:?}", bridge.clock_state());
    info!(
        "Stats: {} decoded, {} dropped, {} reports, {} echoes, {} write failures, {} read failures",
        stats.frames_decoded,
        stats.frames_dropped,
        stats.reports_sent,
        stats.echoes_sent,
        stats.write_failures,
        stats.read_failures
    );
}
