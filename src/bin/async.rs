use shelly_relay::tokio::discovery;

#[tokio::main]
async fn main() {
    match discovery::discover().await {
        Ok(devices) => devices.into_iter().for_each(|device| {
            println!("{}\t{}", device.ip, device.name);
        }),
        Err(err) => eprintln!("{}", err),
    }
}
