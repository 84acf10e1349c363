use shelly_relay::{devices::Device, discovery::discover};

fn main() {
    for device in discover().unwrap() {
        let kind = match Device::from_discovered(&device) {
            Device::Shelly1(_) => "Shelly 1",
            Device::Shelly1PM(_) => "Shelly 1PM",
            Device::ShellyPlugS(_) => "Shelly Plug S",
            Device::Unknown(_) => "unknown",
        };
        println!("{}\t{}\t{}", device.ip, device.name, kind);
    }
}
