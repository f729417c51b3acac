//! Basic example of binding twin properties to a report transport

use twinsync_core::{RequestId, TwinBinding, TwinSyncEngine, TwinValue, ValueKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let bindings = vec![
        TwinBinding::new("DesiredTemperature", ValueKind::Float).with_handler(|binding| {
            if let Some(value) = binding.value() {
                println!("  set point is now {value}");
            }
            Ok(())
        }),
        TwinBinding::new("HvacOn", ValueKind::Boolean),
        TwinBinding::new("DisplayName", ValueKind::String),
    ];

    let mut engine = TwinSyncEngine::new(bindings, |binding: &TwinBinding, fragment: &str| {
        println!("  submitting {fragment} for '{}'", binding.name());
        true
    });

    println!("=== TwinSync Thermostat Example ===\n");
    println!("Opened {} bindings", engine.open());

    // A full twin document as the cloud side would deliver it
    let payload = br#"{
        "desired": {
            "DesiredTemperature": { "value": 21.5 },
            "HvacOn": { "value": true },
            "DisplayName": { "value": "living room" }
        }
    }"#;

    println!("\nApplying desired update...");
    let updated = engine.handle_desired_update(payload, RequestId(1));
    println!("Updated {updated} properties");

    // Host-initiated report, e.g. after a local override at the device
    println!("\nReporting a local override...");
    let accepted = engine.report_state("DesiredTemperature", TwinValue::from(19.0), RequestId(2))?;
    println!("Transport accepted: {accepted}");

    // Later the transport acknowledges; resolve the request id back
    println!("\nResolving acknowledgement...");
    if let Some(binding) = engine.acknowledge(RequestId(2), 200) {
        println!("Acknowledgement was for '{}'", binding.name());
    }

    engine.close();
    Ok(())
}
