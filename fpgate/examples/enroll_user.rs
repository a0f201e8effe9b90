//! Enrollment example
//!
//! Watches the event stream in a background task so prompts ("place
//! finger", "remove finger") show up while the exchange runs.

use fpgate::Device;

#[tokio::main]
async fn main() -> fpgate::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let port = std::env::var("SENSOR_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());
    let username = std::env::args().nth(1).unwrap_or_else(|| "alice".to_string());

    let mut device = Device::new(port, 9600);

    let mut events = device.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("[{}] {}", event.at.format("%H:%M:%S"), event.kind);
        }
    });

    device.connect().await?;
    println!("Connected. Enrolling {}...", username);

    let record = device.enroll(&username).await?;
    println!("Enrolled: {}", record);

    device.disconnect().await?;
    Ok(())
}
