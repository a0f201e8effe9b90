//! Verification example

use fpgate::{Device, Verification};

#[tokio::main]
async fn main() -> fpgate::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let port = std::env::var("SENSOR_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    println!("Connecting to {}...", port);

    let mut device = Device::new(port, 9600);
    device.connect().await?;

    println!("Registered users:");
    for user in device.users() {
        println!("  {}", user);
    }

    println!("Place a finger on the sensor...");
    match device.verify().await? {
        Verification::Known { username, slot_id } => {
            println!("Welcome back, {} (slot {})", username, slot_id);
        }
        Verification::Unknown { slot_id } => {
            println!("Matched slot {} but no user is registered for it", slot_id);
        }
    }

    device.disconnect().await?;
    Ok(())
}
