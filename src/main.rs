extern crate shelly_relay;

use std::{process, time::Duration};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use shelly_relay::{
    capabilities::{DeviceActions, PowerMeter, Relay},
    devices::RawDevice,
    discovery::{self, DiscoveredDevice, ScanOptions, SystemResolver},
    error::{Error, Result},
};

fn command_discover(args: &ArgMatches, json: bool) -> Result<()> {
    let mut options = ScanOptions::default();
    if let Some(base) = args.value_of("base") {
        options.base = Some(base.parse()?);
    }
    if let Some(end) = args.value_of("end") {
        options.end = parse_number(end, "end")?;
    }
    if let Some(threads) = args.value_of("threads") {
        options.threads = parse_number(threads, "threads")?;
    }

    let mut devices = discovery::scan(&options, &SystemResolver)?;
    if !args.is_present("all") {
        devices = discovery::filter_by_name(devices, discovery::SHELLY_NAME_PATTERN);
    }

    for device in devices {
        if json {
            println!("{}", serde_json::to_string(&device)?);
        } else {
            discover_print_human(&device);
        }
    }
    Ok(())
}

fn discover_print_human(device: &DiscoveredDevice) {
    println!("{}\t{}", pad(&device.ip.to_string(), 15), device.name);
}

fn pad(value: &str, padding: usize) -> String {
    let pad = " ".repeat(padding.saturating_sub(value.len()));
    format!("{}{}", value, pad)
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Other(format!("Invalid --{}: {}", name, value)))
}

fn device(args: &ArgMatches) -> Result<RawDevice> {
    let addr = args.value_of("ADDR").unwrap_or_default();
    RawDevice::new(addr).map_err(|err| Error::Other(format!("Invalid address {}: {}", addr, err)))
}

fn timer(args: &ArgMatches) -> Result<Option<Duration>> {
    args.value_of("timer")
        .map(|secs| parse_number(secs, "timer").map(Duration::from_secs))
        .transpose()
}

fn print_value(value: &Value, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let (name, args) = match matches.subcommand() {
        (name, Some(args)) => (name, args),
        _ => return Ok(()),
    };
    let json = matches.is_present("json") || args.is_present("json");

    match name {
        "discover" => command_discover(args, json),
        "settings" => print_value(&device(args)?.settings()?, json),
        "status" => print_value(&device(args)?.status()?, json),
        "on" => print_value(&device(args)?.switch_on(timer(args)?)?, json),
        "off" => print_value(&device(args)?.switch_off(timer(args)?)?, json),
        "toggle" => print_value(&device(args)?.toggle(timer(args)?)?, json),
        "power" => {
            let watts = device(args)?.current_power_usage()?;
            if json {
                println!("{}", serde_json::json!({ "power": watts }));
            } else {
                println!("{} W", watts);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn address_arg() -> Arg<'static, 'static> {
    Arg::with_name("ADDR")
        .help("Device address, e.g. 192.168.1.40 or 192.168.1.40:8080")
        .required(true)
        .index(1)
}

fn timer_arg() -> Arg<'static, 'static> {
    Arg::with_name("timer")
        .long("timer")
        .takes_value(true)
        .value_name("SECS")
        .help("Revert to the previous state after this many seconds.")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("Shelly smart plug CLI")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover and interact with Shelly smart plugs on the local network.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("json")
            .long("json")
            .global(true)
            .takes_value(false)
            .help("Respond with JSON.")
        )
        .subcommand(SubCommand::with_name("discover")
            .about("Discover devices on the local network")
            .arg(Arg::with_name("end")
                .long("end")
                .takes_value(true)
                .help("Last host number to probe (default 255).")
            )
            .arg(Arg::with_name("base")
                .long("base")
                .takes_value(true)
                .help("Base prefix such as 192.168.1. (default: the local /24).")
            )
            .arg(Arg::with_name("threads")
                .long("threads")
                .takes_value(true)
                .help("Concurrent reverse lookups (default 32).")
            )
            .arg(Arg::with_name("all")
                .long("all")
                .takes_value(false)
                .help("List every host that resolves, not only Shelly devices.")
            )
        )
        .subcommand(SubCommand::with_name("settings")
            .about("Show the device settings")
            .arg(address_arg())
        )
        .subcommand(SubCommand::with_name("status")
            .about("Show the device status")
            .arg(address_arg())
        )
        .subcommand(SubCommand::with_name("on")
            .about("Switch the relay on")
            .arg(address_arg())
            .arg(timer_arg())
        )
        .subcommand(SubCommand::with_name("off")
            .about("Switch the relay off")
            .arg(address_arg())
            .arg(timer_arg())
        )
        .subcommand(SubCommand::with_name("toggle")
            .about("Toggle the relay")
            .arg(address_arg())
            .arg(timer_arg())
        )
        .subcommand(SubCommand::with_name("power")
            .about("Show the current power usage in watts")
            .arg(address_arg())
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
