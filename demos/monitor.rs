use std::env;
use std::time::Duration;

use cosa_thermostat::CosaClient;

#[tokio::main]
async fn main() -> cosa_thermostat::Result<()> {
    tracing_subscriber::fmt::init();

    let email = env::var("COSA_EMAIL").expect("set COSA_EMAIL");
    let password = env::var("COSA_PASSWORD").expect("set COSA_PASSWORD");

    let mut client = CosaClient::builder()
        .on_event(|event| {
            println!("{event:?}");
        })
        .on_snapshot(|state| {
            let current = state
                .current_temperature
                .map(|c| format!("{c:.1}"))
                .unwrap_or_else(|| "--".to_string());
            let target = state
                .target_temperature()
                .map(|c| format!("{c:.1}"))
                .unwrap_or_else(|| "--".to_string());
            let humidity = state
                .current_humidity
                .map(|h| format!("{h:.0}%"))
                .unwrap_or_else(|| "--".to_string());
            println!(
                "[{}] {current}\u{00b0}C -> {target}\u{00b0}C | preset: {} | {:?} | {} | humidity: {humidity}",
                state.name,
                state.preset,
                state.power,
                state.activity.as_str(),
            );
        })
        .build();

    println!("Logging in...");
    client.login(&email, &password).await?;

    let endpoints = client.endpoints().await?;
    let device = env::args()
        .nth(1)
        .or_else(|| endpoints.first().map(|e| e.id.clone()))
        .expect("no devices on account; usage: monitor [device-id]");
    println!("Monitoring device {device}. Polling every 10s...");
    client.select_endpoint(device);

    loop {
        if let Err(e) = client.refresh().await {
            eprintln!("Poll error: {e}");
        }
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
}
