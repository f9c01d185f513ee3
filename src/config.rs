use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use config::{Config as ConfigLoader, Environment};
use is_terminal::IsTerminal;
use once_cell::sync::Lazy;
use serde::Deserialize;

const PREFIX: &str = "MYIP";

pub static CONFIG: Lazy<Config> = Lazy::new(|| init_config());

#[derive(Debug, Default)]
pub enum LogStyle {
    #[default]
    Auto,
    Always,
    Never,
}

impl LogStyle {
    /// Logs go to stderr, so `Auto` asks whether stderr is a terminal.
    pub fn is_color(&self) -> bool {
        match self {
            LogStyle::Auto => std::io::stderr().is_terminal(),
            LogStyle::Always => true,
            LogStyle::Never => false,
        }
    }
}

impl<'de> Deserialize<'de> for LogStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?.to_lowercase();
        match s.as_str() {
            "auto" => Ok(LogStyle::Auto),
            "always" => Ok(LogStyle::Always),
            "never" => Ok(LogStyle::Never),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["auto", "always", "never"],
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Log {
    pub level: String,
    pub style: LogStyle,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: Self::level(),
            style: LogStyle::default(),
        }
    }
}

impl Log {
    fn level() -> String {
        String::from("myip=info")
    }
}

/// Request headers the edge platform uses to hand client facts to the origin.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HostHeaders {
    pub client_ip: String,
    pub asn: String,
    pub country_name: String,
    pub country_code: String,
    pub region_name: String,
    pub city_name: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for HostHeaders {
    fn default() -> Self {
        Self {
            client_ip: String::from("eo-connecting-ip"),
            asn: String::from("eo-client-asn"),
            country_name: String::from("eo-client-country-name"),
            country_code: String::from("eo-client-ipcountry"),
            region_name: String::from("eo-client-region"),
            city_name: String::from("eo-client-city"),
            latitude: String::from("eo-client-latitude"),
            longitude: String::from("eo-client-longitude"),
        }
    }
}

impl HostHeaders {
    pub fn validate(&self) -> Result<(), String> {
        let names = [
            ("client_ip", &self.client_ip),
            ("asn", &self.asn),
            ("country_name", &self.country_name),
            ("country_code", &self.country_code),
            ("region_name", &self.region_name),
            ("city_name", &self.city_name),
            ("latitude", &self.latitude),
            ("longitude", &self.longitude),
        ];
        for (field, name) in names {
            if axum::http::HeaderName::try_from(name.as_str()).is_err() {
                return Err(format!("headers.{field} is not a valid header name: {name:?}"));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub log: Log,
    pub addr: SocketAddr,
    pub web_dir: String,
    pub headers: HostHeaders,
    pub reporter_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log: Log::default(),
            addr: Self::addr(),
            web_dir: Self::web_dir(),
            headers: HostHeaders::default(),
            reporter_url: Self::reporter_url(),
        }
    }
}

impl Config {
    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 3030)
    }

    fn web_dir() -> String {
        String::from("dist")
    }

    fn reporter_url() -> String {
        String::from("http://127.0.0.1:3030/ip")
    }
}

pub fn init_config() -> Config {
    let config = ConfigLoader::builder()
        .add_source(
            Environment::with_prefix(PREFIX)
                .separator("_")
                .try_parsing(true),
        )
        .add_source(
            Environment::with_prefix(PREFIX)
                .separator("__")
                .prefix_separator("_")
                .try_parsing(true),
        )
        .build()
        .and_then(|cfg| cfg.try_deserialize::<Config>());

    match config {
        Ok(config) => {
            if let Err(err) = config.headers.validate() {
                panic!("{}", err);
            }
            config
        }
        Err(err) => {
            panic!("{:?}", err);
        }
    }
}
