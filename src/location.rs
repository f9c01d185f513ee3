use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    IPv4,
    IPv6,
}

impl Protocol {
    pub fn of(ip: &str) -> Self {
        if ip.contains(':') {
            Protocol::IPv6
        } else {
            Protocol::IPv4
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::IPv4 => f.write_str("IPv4"),
            Protocol::IPv6 => f.write_str("IPv6"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geo {
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub asn: String,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub country_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub country_code_alpha2: String,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub region_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub city_name: String,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub latitude: String,
    #[serde(default = "unknown", deserialize_with = "lenient_string")]
    pub longitude: String,
}

impl Default for Geo {
    fn default() -> Self {
        Self {
            asn: unknown(),
            country_name: unknown(),
            country_code_alpha2: unknown(),
            region_name: unknown(),
            city_name: unknown(),
            latitude: unknown(),
            longitude: unknown(),
        }
    }
}

impl Geo {
    /// Coordinates rounded to two decimals, `None` unless both parse.
    pub fn coordinates(&self) -> Option<String> {
        if self.latitude == UNKNOWN {
            return None;
        }
        let lat: f64 = self.latitude.parse().ok()?;
        let lon: f64 = self.longitude.parse().ok()?;
        Some(format!("{lat:.2}, {lon:.2}"))
    }
}

/// Where the platform saw the request coming from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLocation {
    pub ip: String,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub geo: Geo,
    #[serde(default)]
    pub timestamp: i64,
}

impl ClientLocation {
    pub fn protocol(&self) -> Protocol {
        self.protocol.unwrap_or_else(|| Protocol::of(&self.ip))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: String::from("success"),
            code: 200,
            data: Some(data),
            message: None,
            timestamp: None,
        }
    }

    pub fn error(code: u16, message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            status: String::from("error"),
            code,
            data: None,
            message: Some(message.into()),
            timestamp: Some(timestamp),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

pub fn unknown() -> String {
    String::from(UNKNOWN)
}

/// Accepts strings and numbers, maps null and empty strings to `Unknown`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => unknown(),
    })
}
