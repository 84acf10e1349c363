use std::{fmt, time::Duration};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    datatypes::{RelayStatus, Status},
    error::Result,
};

const RELAY_PATH: &str = "/relay/0";

/// Value of the `turn` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    On,
    Off,
    Toggle,
}

impl RelayCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayCommand::On => "on",
            RelayCommand::Off => "off",
            RelayCommand::Toggle => "toggle",
        }
    }
}

impl From<bool> for RelayCommand {
    fn from(on: bool) -> Self {
        if on {
            RelayCommand::On
        } else {
            RelayCommand::Off
        }
    }
}

impl fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The device only takes whole seconds; a partial second rounds up so a short
// timer is never sent as 0, which the device reads as "no timer"
fn timer_secs(timer: Duration) -> u64 {
    if timer.subsec_nanos() > 0 {
        timer.as_secs() + 1
    } else {
        timer.as_secs()
    }
}

/// Path and query for a relay change
pub fn relay_path(command: RelayCommand, timer: Option<Duration>) -> String {
    match timer {
        Some(timer) => format!("{}?turn={}&timer={}", RELAY_PATH, command, timer_secs(timer)),
        None => format!("{}?turn={}", RELAY_PATH, command),
    }
}

pub trait DeviceActions {
    /// Request a path from the device and return its parsed response
    fn send<T: DeserializeOwned>(&self, path: &str) -> Result<T>;

    fn settings(&self) -> Result<Value> {
        self.send("/settings")
    }

    fn status(&self) -> Result<Value> {
        self.send("/status")
    }
}

pub trait Relay: DeviceActions {
    /// Switch the relay to the given state. The device answers with its
    /// resulting relay state, which is unchanged if it was already there.
    ///
    /// A timer reverts the change after that many seconds, rounded up.
    fn set_relay_state(&self, on: bool, timer: Option<Duration>) -> Result<Value> {
        self.send(&relay_path(RelayCommand::from(on), timer))
    }

    fn switch_on(&self, timer: Option<Duration>) -> Result<Value> {
        self.set_relay_state(true, timer)
    }

    fn switch_off(&self, timer: Option<Duration>) -> Result<Value> {
        self.set_relay_state(false, timer)
    }

    fn toggle(&self, timer: Option<Duration>) -> Result<Value> {
        self.send(&relay_path(RelayCommand::Toggle, timer))
    }

    fn relay_status(&self) -> Result<RelayStatus> {
        self.send(RELAY_PATH)
    }

    fn is_on(&self) -> Result<bool> {
        Ok(self.relay_status()?.ison)
    }

    fn is_off(&self) -> Result<bool> {
        Ok(!self.is_on()?)
    }
}

pub trait PowerMeter: DeviceActions {
    /// Current draw in watts from the first meter.
    ///
    /// Devices without metering hardware report no meters, which is an
    /// error rather than a zero reading.
    fn current_power_usage(&self) -> Result<f64> {
        self.send::<Status>("/status")?.power()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_path_without_timer() {
        assert_eq!(relay_path(RelayCommand::On, None), "/relay/0?turn=on");
        assert_eq!(relay_path(RelayCommand::Off, None), "/relay/0?turn=off");
        assert_eq!(relay_path(RelayCommand::Toggle, None), "/relay/0?turn=toggle");
    }

    #[test]
    fn relay_path_with_timer_keeps_command() {
        let timer = Some(Duration::from_secs(30));
        assert_eq!(relay_path(RelayCommand::On, timer), "/relay/0?turn=on&timer=30");
        assert_eq!(relay_path(RelayCommand::Off, timer), "/relay/0?turn=off&timer=30");
        assert_eq!(
            relay_path(RelayCommand::Toggle, Some(Duration::from_secs(10))),
            "/relay/0?turn=toggle&timer=10"
        );
    }

    #[test]
    fn relay_path_rounds_partial_seconds_up() {
        let timer = Some(Duration::from_millis(2750));
        assert_eq!(relay_path(RelayCommand::On, timer), "/relay/0?turn=on&timer=3");

        let timer = Some(Duration::from_millis(500));
        assert_eq!(relay_path(RelayCommand::Off, timer), "/relay/0?turn=off&timer=1");
    }

    #[test]
    fn command_from_bool() {
        assert_eq!(RelayCommand::from(true), RelayCommand::On);
        assert_eq!(RelayCommand::from(false), RelayCommand::Off);
    }
}
