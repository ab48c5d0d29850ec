//! Shape of the CFX server-list response.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::PollerError;

pub const DEFAULT_MAX_PLAYERS: u32 = 32;

#[derive(Debug, Deserialize)]
struct ServerListEntry {
    #[serde(rename = "Data", default)]
    data: Option<Value>,
}

/// The `Data` object of a server-list entry.
///
/// The endpoint reports some values under more than one key; see
/// [`ServerData::max_players`] and [`ServerData::current_count`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerData {
    #[serde(default, deserialize_with = "lenient_text")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub clients: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sv_maxclients: Option<u32>,
    #[serde(rename = "selfReportedClients", default, deserialize_with = "lenient_count")]
    pub self_reported_clients: Option<u32>,
    #[serde(rename = "svMaxclients", default, deserialize_with = "lenient_count")]
    pub sv_max_clients_alt: Option<u32>,
}

impl ServerData {
    /// Parses a response body. A missing or `null` `Data` is an error, as is
    /// anything that is not JSON or a `Data` that is not an object.
    pub fn from_slice(body: &[u8]) -> Result<Self, PollerError> {
        let entry: ServerListEntry = serde_json::from_slice(body)?;
        match entry.data {
            None | Some(Value::Null) => Err(PollerError::MissingData),
            // Checked up front: serde would also accept an array for a struct.
            Some(data @ Value::Object(_)) => Ok(ServerData::deserialize(data)?),
            Some(other) => Err(PollerError::Decode(serde_json::Error::custom(format!(
                "Data must be an object, got {}",
                value_kind(&other)
            )))),
        }
    }

    /// `sv_maxclients`, then `svMaxclients`, then 32. Zero counts as unset.
    pub fn max_players(&self) -> u32 {
        first_nonzero(&[self.sv_maxclients, self.sv_max_clients_alt]).unwrap_or(DEFAULT_MAX_PLAYERS)
    }

    /// `clients`, then `selfReportedClients`, then 0. Zero counts as unset.
    pub fn current_count(&self) -> u32 {
        first_nonzero(&[self.clients, self.self_reported_clients]).unwrap_or(0)
    }

    pub fn hostname(&self) -> Option<String> {
        self.hostname.clone().filter(|h| !h.is_empty())
    }
}

fn first_nonzero(candidates: &[Option<u32>]) -> Option<u32> {
    candidates.iter().flatten().copied().find(|n| *n > 0)
}

// Counts arrive as numbers or numeric strings depending on the server build.
// Anything else is treated as absent rather than failing the whole payload.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n.min(u32::MAX as u64) as u32),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// Display-only field; a wrong type must not take the server offline.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
