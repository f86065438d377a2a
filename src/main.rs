use beacon_positioning::api::JsonLinesSink;
use beacon_positioning::{
    Advertisement, AlwaysAuthorized, DetectionListFormatter, FilterIdentity, ManufacturerData,
    MockScanner, PathLossModel, Position, ScanConfig, ScanController, SessionEvent,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Observer location the simulated beacons are ranged from
const SIMULATED_POSITION: Position = Position { x: 10.0, y: 5.0 };

/// RSSI a beacon at `distance_m` would report under `model`
fn simulated_rssi(model: &PathLossModel, distance_m: f64) -> i32 {
    let ratio = if distance_m < 1.0 {
        distance_m.powf(0.1)
    } else {
        distance_m.powf(1.0 / model.path_loss_exponent)
    };
    (ratio * model.reference_rssi as f64).round() as i32
}

fn simulated_scanner(config: &ScanConfig) -> MockScanner {
    let model = config.path_loss_model();
    let scanner = MockScanner::new();

    for (index, (identity, point)) in config
        .reference_identities()
        .iter()
        .zip(&config.reference_points)
        .enumerate()
    {
        let rssi = simulated_rssi(&model, SIMULATED_POSITION.distance_to(point));
        let adv = MockScanner::ibeacon_advertisement(format!("beacon-{}", index + 1), *identity, rssi)
            .with_name(format!("Reference {}", index + 1));
        // A repeat sighting with a different reading is dropped by the registry
        scanner.add_advertisement(adv.clone());
        scanner.add_advertisement(Advertisement { rssi: rssi + 12, ..adv });
    }

    // Traffic the pipeline must ignore
    scanner.add_advertisement(
        Advertisement::new("phone", -48)
            .with_local_name("Phone")
            .with_manufacturer_data(ManufacturerData::Raw(vec![0x06, 0x00, 0x01, 0x09, 0x20])),
    );
    scanner.add_advertisement(MockScanner::ibeacon_advertisement("stranger", FilterIdentity::new(1, 1), -60));

    scanner
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1).map(String::as_str) {
        Some("-h") | Some("--help") => {
            eprintln!(
                "Usage: {} [config.json]",
                args.first().map_or("beacon-positioning", |s| s.as_str())
            );
            return Ok(());
        }
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };

    info!(
        x = SIMULATED_POSITION.x,
        y = SIMULATED_POSITION.y,
        window_ms = config.scan_duration_ms,
        "simulating reference beacons"
    );

    let scanner = Arc::new(simulated_scanner(&config));
    let controller = ScanController::new(config, scanner, Arc::new(AlwaysAuthorized))?
        .with_sink(Arc::new(JsonLinesSink::new(std::io::stdout())));

    controller.register_observer(|event: &SessionEvent| {
        if let SessionEvent::DetectionAdmitted { detection, count } = event {
            info!(name = %detection.name, rssi = detection.rssi, count, "detected");
        }
    });

    let outcome = controller.run_scan().await?;

    println!("{}", DetectionListFormatter::format_text(&outcome.detections));
    match outcome.position {
        Some(position) => println!(
            "Position: ({:.3}, {:.3}), residual {:.3} m",
            position.x,
            position.y,
            outcome.residual_m.unwrap_or_default()
        ),
        None => println!(
            "No position: {} {}",
            outcome.reason,
            outcome.failure.as_deref().unwrap_or_default()
        ),
    }

    Ok(())
}
