//! Typed views over the device's JSON bodies
//!
//! Only the fields an operation needs are required; everything else is
//! optional so that firmware revisions which add or drop fields still parse.
use crate::error::{Error, Result};

/// Body of `GET /relay/0`, also embedded in `/status` under `relays`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RelayStatus {
    pub ison: bool,
    pub has_timer: Option<bool>,
    pub timer_started: Option<u64>,
    pub timer_duration: Option<f64>,
    pub timer_remaining: Option<f64>,
    pub overpower: Option<bool>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Meter {
    pub power: Option<f64>,
    pub overpower: Option<f64>,
    pub is_valid: Option<bool>,
    pub timestamp: Option<u64>,
    pub counters: Option<Vec<f64>>,
    pub total: Option<f64>,
}

/// Body of `GET /status`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Status {
    pub relays: Option<Vec<RelayStatus>>,
    pub meters: Option<Vec<Meter>>,
    pub temperature: Option<f64>,
    pub overtemperature: Option<bool>,
    pub uptime: Option<u64>,
    pub mac: Option<String>,
}

impl Status {
    /// Power drawn in watts according to the first meter
    pub fn power(&self) -> Result<f64> {
        let meters = self
            .meters
            .as_ref()
            .ok_or_else(|| Error::unsupported("no meters reported"))?;
        let meter = meters
            .first()
            .ok_or_else(|| Error::unsupported("meter list is empty"))?;
        meter
            .power
            .ok_or_else(|| Error::unsupported("first meter has no power reading"))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const RELAY_ON_JSON: &'static str = r#"{
      "ison": true,
      "has_timer": false,
      "timer_started": 0,
      "timer_duration": 0,
      "timer_remaining": 0,
      "overpower": false,
      "source": "http"
    }"#;

    pub const RELAY_OFF_TIMER_JSON: &'static str = r#"{
      "ison": false,
      "has_timer": true,
      "timer_started": 1601301421,
      "timer_duration": 30.00,
      "timer_remaining": 29.87,
      "overpower": false,
      "source": "http"
    }"#;

    pub const SHELLY1PM_STATUS_JSON: &'static str = r#"{
      "wifi_sta": {"connected": true, "ssid": "attic", "ip": "192.168.1.40", "rssi": -58},
      "cloud": {"enabled": false, "connected": false},
      "mqtt": {"connected": false},
      "time": "14:02",
      "unixtime": 1601301421,
      "serial": 12,
      "has_update": false,
      "mac": "A4CF12F45A1B",
      "relays": [
        {
          "ison": true,
          "has_timer": false,
          "timer_started": 0,
          "timer_duration": 0,
          "timer_remaining": 0,
          "overpower": false,
          "source": "http"
        }
      ],
      "meters": [
        {
          "power": 4.2,
          "overpower": 0.00,
          "is_valid": true,
          "timestamp": 1601308621,
          "counters": [4.311, 4.160, 4.092],
          "total": 1543
        }
      ],
      "temperature": 41.27,
      "overtemperature": false,
      "uptime": 86133
    }"#;

    pub const SHELLY1_STATUS_JSON: &'static str = r#"{
      "wifi_sta": {"connected": true, "ssid": "attic", "ip": "192.168.1.41", "rssi": -62},
      "mac": "A4CF12F45A2C",
      "relays": [
        {
          "ison": false,
          "has_timer": false,
          "timer_started": 0,
          "timer_duration": 0,
          "timer_remaining": 0,
          "source": "input"
        }
      ],
      "meters": [],
      "uptime": 5120
    }"#;

    #[test]
    fn deserialise_relay_status() {
        let relay = serde_json::from_str::<RelayStatus>(RELAY_ON_JSON).unwrap();
        assert!(relay.ison);
        assert_eq!(relay.source.as_deref(), Some("http"));

        let relay = serde_json::from_str::<RelayStatus>(RELAY_OFF_TIMER_JSON).unwrap();
        assert!(!relay.ison);
        assert_eq!(relay.has_timer, Some(true));
        assert_eq!(relay.timer_duration, Some(30.0));
    }

    #[test]
    fn deserialise_shelly1pm_status() {
        let status = serde_json::from_str::<Status>(SHELLY1PM_STATUS_JSON).unwrap();

        assert_eq!(status.power().unwrap(), 4.2);
        assert_eq!(status.relays.unwrap()[0].ison, true);
        assert_eq!(status.mac.as_deref(), Some("A4CF12F45A1B"));
    }

    #[test]
    fn empty_meter_list_is_unsupported() {
        let status = serde_json::from_str::<Status>(SHELLY1_STATUS_JSON).unwrap();

        match status.power() {
            Err(Error::Unsupported(_)) => {}
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[test]
    fn missing_meter_list_is_unsupported() {
        let status = serde_json::from_str::<Status>(r#"{"relays": []}"#).unwrap();
        assert!(status.power().is_err());
    }

    #[test]
    fn meter_without_power_is_unsupported() {
        let status = serde_json::from_str::<Status>(r#"{"meters": [{"is_valid": false}]}"#).unwrap();
        assert!(status.power().is_err());
    }
}
