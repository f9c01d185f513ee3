use serde_json::{Map, Value};

use super::ProviderGeo;

/// What a provider body yielded: the IP if one was found, and whatever geo
/// fields the provider volunteers.
#[derive(Debug, Default, PartialEq)]
pub struct Parsed {
    pub ip: Option<String>,
    pub geo: Option<ProviderGeo>,
}

impl Parsed {
    fn from_ip(ip: Option<String>) -> Self {
        Self {
            ip: ip.filter(|ip| !ip.is_empty()),
            geo: None,
        }
    }
}

pub trait IpLookupParser: Send + Sync {
    fn parse(&self, body: &str) -> Parsed;
}

/// Body is the address itself.
#[derive(Default, Clone, Copy)]
pub struct PlainTextIpParser;

impl IpLookupParser for PlainTextIpParser {
    fn parse(&self, body: &str) -> Parsed {
        Parsed::from_ip(Some(body.trim().to_string()))
    }
}

/// Body is a JSON object with an `ip` member. With `raw_fallback`, a body
/// that is not JSON at all is taken as the address.
#[derive(Default, Clone, Copy)]
pub struct JsonIpParser {
    raw_fallback: bool,
}

impl JsonIpParser {
    pub fn with_raw_fallback() -> Self {
        Self { raw_fallback: true }
    }
}

impl IpLookupParser for JsonIpParser {
    fn parse(&self, body: &str) -> Parsed {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Parsed::from_ip(string_member(&value, "ip")),
            Err(_) if self.raw_fallback => Parsed::from_ip(Some(body.trim().to_string())),
            Err(_) => Parsed::default(),
        }
    }
}

/// Cloudflare `/cdn-cgi/trace` output: one `key=value` per line.
#[derive(Default, Clone, Copy)]
pub struct TraceParser;

impl IpLookupParser for TraceParser {
    fn parse(&self, body: &str) -> Parsed {
        let mut geo = ProviderGeo::new();
        for line in body.lines() {
            let mut parts = line.split('=');
            let key = parts.next().unwrap_or_default().trim();
            let value = parts.next().unwrap_or_default().trim();
            if !key.is_empty() && !value.is_empty() {
                geo.insert(key.to_string(), value.to_string());
            }
        }
        Parsed {
            ip: geo.get("ip").cloned(),
            geo: Some(geo),
        }
    }
}

/// Geo-IP JSON object; scalar members are kept as geo.
#[derive(Default, Clone, Copy)]
pub struct GeoJsonParser;

impl IpLookupParser for GeoJsonParser {
    fn parse(&self, body: &str) -> Parsed {
        let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
            return Parsed::default();
        };
        Parsed {
            ip: string_member_of(&object, "ip").filter(|ip| !ip.is_empty()),
            geo: Some(scalars(&object)),
        }
    }
}

fn string_member(value: &Value, key: &str) -> Option<String> {
    value.as_object().and_then(|object| string_member_of(object, key))
}

fn string_member_of(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key)?.as_str().map(str::to_string)
}

fn scalars(object: &Map<String, Value>) -> ProviderGeo {
    object
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}
