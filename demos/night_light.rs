use std::time::Duration;

use shelly_relay::{capabilities::Relay, devices::Device, discovery::discover};

// Switch every discovered Shelly on for ten minutes
fn main() {
    let timer = Some(Duration::from_secs(600));

    for record in discover().unwrap() {
        let result = match Device::from_discovered(&record) {
            Device::Shelly1(device) => device.switch_on(timer),
            Device::Shelly1PM(device) => device.switch_on(timer),
            Device::ShellyPlugS(device) => device.switch_on(timer),
            Device::Unknown(device) => device.switch_on(timer),
        };
        match result {
            Ok(state) => println!("{}\t{}", record.name, state["ison"]),
            Err(err) => eprintln!("{}\t{}", record.name, err),
        }
    }
}
