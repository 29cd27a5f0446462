//! Per-session state and packet handling

use std::collections::BTreeMap;
use std::sync::Arc;

use deathlink_core::{ClockAnchor, CounterState, MonotonicClock, NotificationEvent};
use reporter::CountSignal;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::protocol::ServerPacket;

/// Everything the client knows about the current session
///
/// Owned by the session task. The reporter only sees the count signal.
pub struct SessionContext {
    counter: CounterState,
    anchor: ClockAnchor,
    clock: Arc<dyn MonotonicClock>,
    signal: CountSignal,
    echo_deaths: bool,
    client_index: Option<i64>,
    data_storage: BTreeMap<String, Value>,
}

impl SessionContext {
    pub fn new(clock: Arc<dyn MonotonicClock>, signal: CountSignal, echo_deaths: bool) -> Self {
        Self {
            counter: CounterState::new(),
            anchor: ClockAnchor::new(),
            clock,
            signal,
            echo_deaths,
            client_index: None,
            data_storage: BTreeMap::new(),
        }
    }

    /// Apply a server packet to the session state
    pub fn on_package(&mut self, packet: &ServerPacket) {
        match packet {
            ServerPacket::RoomInfo { time, .. } => self.on_room_info(time.as_ref()),
            ServerPacket::Connected { slot, .. } => {
                self.client_index = Some(*slot);
            }
            ServerPacket::Bounced { data, .. } if packet.is_death_link() => {
                self.on_death_link(data);
            }
            ServerPacket::Retrieved { keys } => {
                for (key, value) in keys {
                    self.data_storage.insert(key.clone(), value.clone());
                }
            }
            ServerPacket::SetReply { key, value } => {
                self.data_storage.insert(key.clone(), value.clone());
            }
            ServerPacket::PrintJson { data } => {
                let text: String = data.iter().map(|part| part.text.as_str()).collect();
                if !text.is_empty() {
                    info!("{}", text);
                }
            }
            _ => {}
        }
    }

    fn on_room_info(&mut self, time: Option<&Value>) {
        let local_now = self.clock.now();
        match time {
            None | Some(Value::Null) => debug!("Room info carried no server time"),
            Some(value) => match value.as_f64() {
                Some(server_time) => {
                    if self.anchor.anchor(server_time, local_now) {
                        debug!(server_time, local_now, "Anchored server clock");
                    }
                }
                None => warn!(time = %value, "Ignoring non-numeric server time in room info"),
            },
        }
    }

    /// Handle a death link payload
    ///
    /// Returns `true` if the payload was counted.
    pub fn on_death_link(&mut self, data: &Value) -> bool {
        let event = match NotificationEvent::from_payload(data) {
            Ok(event) => event,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        let estimated = self.estimated_server_time();
        let total = self.counter.record(&event, estimated);
        if self.echo_deaths {
            info!("{}", event.describe());
        }
        self.signal.notify(total);
        true
    }

    /// Current server time estimated from the clock anchor
    pub fn estimated_server_time(&self) -> Option<f64> {
        self.anchor.estimate_now(self.clock.now())
    }

    pub fn count(&self) -> u64 {
        self.counter.count()
    }

    pub fn counter(&self) -> &CounterState {
        &self.counter
    }

    pub fn anchor(&self) -> &ClockAnchor {
        &self.anchor
    }

    pub fn client_index(&self) -> Option<i64> {
        self.client_index
    }

    pub fn data_storage(&self) -> &BTreeMap<String, Value> {
        &self.data_storage
    }

    /// Internal fields for the debug dump, as `(name, rendered value)` pairs
    pub fn client_data(&self) -> Vec<(&'static str, String)> {
        let storage = serde_json::to_string(&self.data_storage).unwrap_or_else(|_| "{}".to_string());
        vec![
            ("death_link_count", self.counter.count().to_string()),
            ("data_storage", storage),
            ("client_index", render(self.client_index)),
            ("server_anchor_time", render(self.anchor.server_time())),
            ("client_anchor_time_measurement", render(self.anchor.local_time())),
            ("last_death_link_received", render(self.counter.last_event_time())),
            ("last_death_link_timed", render(self.counter.last_event_timed())),
        ]
    }
}

/// Floats keep their fractional part (`100.0`, not `100`)
fn render<T: std::fmt::Debug>(value: Option<T>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_else(|| "None".to_string())
}
