#![allow(dead_code)]

use quantedge_signals::{PriceBar, SignalConfig, SignalEvent, SignalKind, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// Thirty hourly bars: a steady rally topping at bar 19, a pullback, and a
/// weaker push to a higher high at bar 27.
pub const RALLY_PATH: &str = "tests/fixtures/data/rally-divergence-1h.csv";

/// Events expected from [`RALLY_PATH`] with [`CONFIG_PATH`].
pub const RALLY_EVENTS_PATH: &str = "tests/fixtures/data/rally-divergence-events.csv";

pub const CONFIG_PATH: &str = "tests/fixtures/data/scenario.toml";

/// Expected event kind at a bar timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RefEvent {
    pub timestamp: Timestamp,
    pub kind: SignalKind,
}

impl From<&SignalEvent> for RefEvent {
    fn from(event: &SignalEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            kind: event.kind,
        }
    }
}

pub fn load_rally_bars() -> Vec<PriceBar> {
    load_records(RALLY_PATH, "invalid bar record")
}

pub fn load_rally_events() -> Vec<RefEvent> {
    load_records(RALLY_EVENTS_PATH, "invalid event record")
}

pub fn load_scenario_config() -> SignalConfig {
    load_scenario_config_with("")
}

/// The scenario config with `extra` TOML lines appended.
pub fn load_scenario_config_with(extra: &str) -> SignalConfig {
    let mut source = std::fs::read_to_string(CONFIG_PATH)
        .unwrap_or_else(|e| panic!("failed to read {CONFIG_PATH}: {e}"));
    source.push_str(extra);

    SignalConfig::from_toml(&source).expect("invalid scenario config")
}

/// Timestamp of the `n`-th bar of [`RALLY_PATH`], counting from 1.
pub fn rally_timestamp(n: u64) -> Timestamp {
    1_700_000_000 + (n - 1) * 3_600
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
