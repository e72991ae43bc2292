use std::env;

use cosa_thermostat::{CosaClient, MessageLogMode, Preset};

#[tokio::main]
async fn main() -> cosa_thermostat::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let email = env::var("COSA_EMAIL").expect("set COSA_EMAIL");
    let password = env::var("COSA_PASSWORD").expect("set COSA_PASSWORD");

    let mut builder = CosaClient::builder().on_event(|event| {
        println!("{event:?}");
    });

    if let Some(i) = args.iter().position(|a| a == "--log") {
        let path = args.get(i + 1).expect("--log needs a path");
        println!("Logging all requests to {path}");
        builder = builder.message_log(MessageLogMode::Full, path.as_str());
    }

    let mut client = builder.build();
    client.login(&email, &password).await?;

    let device = match env::var("COSA_DEVICE") {
        Ok(id) => id,
        Err(_) => {
            let endpoints = client.endpoints().await?;
            let first = endpoints.first().expect("no devices on account");
            println!("Using device {} ({})", first.name, first.id);
            first.id.clone()
        }
    };
    client.select_endpoint(device);
    client.refresh().await?;
    println!("Before: {:?}", client.state().unwrap());

    match (args.get(1).map(String::as_str), args.get(2).map(String::as_str)) {
        (Some("preset"), Some(name)) => {
            let preset = Preset::from_cosa_str(name).expect("unknown preset");
            client.set_preset(preset).await?;
        }
        (Some("temp"), Some(value)) => {
            let celsius: f64 = value.parse().expect("temperature must be a number");
            let active = client.state().unwrap().preset;
            client.set_temperature(active, celsius).await?;
        }
        (Some("power"), Some(flag)) => {
            client.set_power(flag == "on").await?;
        }
        _ => {
            eprintln!("usage: commands <preset NAME | temp C | power on|off> [--log FILE]");
            std::process::exit(2);
        }
    }

    println!("After: {:?}", client.state().unwrap());
    Ok(())
}
