//! Multiworld session protocol packets
//!
//! Every websocket text frame carries a JSON array of packets, each an object
//! tagged by its `cmd` field. Only the packets this client acts on are typed;
//! everything else decodes to `ServerPacket::Unknown` and is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SessionError;

/// Tag carried by death link bounces
pub const DEATH_LINK_TAG: &str = "DeathLink";

/// Tags announced in `Connect`
pub const CLIENT_TAGS: [&str; 3] = ["AP", "Tracker", "DeathLink"];

/// Receive items from own world, other worlds and the starting inventory
pub const ITEMS_HANDLING_ALL: u8 = 0b111;

/// Protocol version sent in `Connect`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    #[serde(default)]
    pub class: VersionClass,
}

/// Constant `"Version"` marker the server expects on version objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionClass {
    #[default]
    Version,
}

impl NetworkVersion {
    pub const CURRENT: NetworkVersion = NetworkVersion {
        major: 0,
        minor: 5,
        build: 1,
        class: VersionClass::Version,
    };
}

/// Packets sent by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerPacket {
    /// Room metadata, sent once right after the socket opens
    RoomInfo {
        #[serde(default)]
        password: bool,
        #[serde(default)]
        seed_name: Option<String>,
        /// Server clock in seconds; kept raw so a bad value can be reported
        #[serde(default)]
        time: Option<Value>,
    },
    Connected {
        #[serde(default)]
        team: Option<i64>,
        slot: i64,
    },
    ConnectionRefused {
        #[serde(default)]
        errors: Vec<String>,
    },
    Bounced {
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        data: Value,
    },
    /// Reply to a data storage `Get`
    Retrieved {
        #[serde(default)]
        keys: Map<String, Value>,
    },
    /// Data storage change notification
    SetReply {
        key: String,
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "PrintJSON")]
    PrintJson {
        #[serde(default)]
        data: Vec<JsonTextPart>,
    },
    #[serde(other)]
    Unknown,
}

/// One fragment of a `PrintJSON` message
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JsonTextPart {
    #[serde(default)]
    pub text: String,
}

impl ServerPacket {
    /// True for bounces tagged as death links
    pub fn is_death_link(&self) -> bool {
        matches!(self, ServerPacket::Bounced { tags, .. } if tags.iter().any(|t| t == DEATH_LINK_TAG))
    }
}

/// Packets sent by this client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd")]
pub enum ClientPacket {
    Connect {
        password: String,
        game: String,
        name: String,
        uuid: String,
        version: NetworkVersion,
        items_handling: u8,
        tags: Vec<String>,
        slot_data: bool,
    },
}

impl ClientPacket {
    /// `Connect` for a gameless death link listener
    pub fn connect(name: &str, password: Option<&str>, uuid: &str) -> Self {
        ClientPacket::Connect {
            password: password.unwrap_or_default().to_string(),
            game: String::new(),
            name: name.to_string(),
            uuid: uuid.to_string(),
            version: NetworkVersion::CURRENT,
            items_handling: ITEMS_HANDLING_ALL,
            tags: CLIENT_TAGS.iter().map(|t| t.to_string()).collect(),
            slot_data: false,
        }
    }
}

/// Decode one text frame into packets
///
/// A frame that is not a JSON array is an error. Individual packets that fail
/// to decode are logged and skipped.
pub fn decode_frame(text: &str) -> Result<Vec<ServerPacket>, SessionError> {
    let raw: Vec<Value> = serde_json::from_str(text)?;
    let mut packets = Vec::with_capacity(raw.len());

    for value in raw {
        let cmd = value
            .get("cmd")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();
        match serde_json::from_value::<ServerPacket>(value) {
            Ok(packet) => packets.push(packet),
            Err(e) => warn!(cmd = %cmd, error = %e, "Skipping undecodable packet"),
        }
    }

    Ok(packets)
}

/// Encode packets into one text frame
pub fn encode_frame(packets: &[ClientPacket]) -> Result<String, SessionError> {
    Ok(serde_json::to_string(packets)?)
}
