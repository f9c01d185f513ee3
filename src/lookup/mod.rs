use std::{collections::BTreeMap, fmt};

use crate::error::FetchError;

mod http_client;
mod parser;
mod provider;
mod reporter;

pub use http_client::{HttpClient, PROVIDER_TIMEOUT};
pub use parser::{GeoJsonParser, JsonIpParser, PlainTextIpParser, TraceParser};
#[cfg(test)]
pub use provider::Endpoints;
pub use provider::HttpIpLookup;
pub use reporter::own_location;

/// Free-form geo fields as a provider reported them.
pub type ProviderGeo = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderId {
    DualStack,
    Cloudflare,
    IpSb,
    IpInfo,
    Ipify,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderId::DualStack => "yinghualuo.cn",
            ProviderId::Cloudflare => "Cloudflare",
            ProviderId::IpSb => "IP.SB",
            ProviderId::IpInfo => "IPInfo.io",
            ProviderId::Ipify => "ipify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok(String),
    Blocked,
    Timeout,
    Error,
}

impl From<FetchError> for Outcome {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Blocked(_) => Outcome::Blocked,
            FetchError::Timeout => Outcome::Timeout,
            FetchError::Request(_) | FetchError::Status(_) | FetchError::Body(_) => Outcome::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub provider: ProviderId,
    pub version: IpVersion,
    pub outcome: Outcome,
    pub geo: Option<ProviderGeo>,
}

/// The five providers queried on every run.
pub struct Aggregator<'a> {
    pub dual_stack: HttpIpLookup<'a, JsonIpParser>,
    pub cloudflare: HttpIpLookup<'a, TraceParser>,
    pub ipsb: HttpIpLookup<'a, GeoJsonParser>,
    pub ipinfo: HttpIpLookup<'a, PlainTextIpParser>,
    pub ipify: HttpIpLookup<'a, JsonIpParser>,
}

impl<'a> Aggregator<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self {
            dual_stack: HttpIpLookup::dual_stack(client),
            cloudflare: HttpIpLookup::cloudflare(client),
            ipsb: HttpIpLookup::ipsb(client),
            ipinfo: HttpIpLookup::ipinfo(client),
            ipify: HttpIpLookup::ipify(client),
        }
    }

    /// Queries every provider over both IP versions at once and waits for all
    /// ten to settle. Each call carries its own timeout, so none can hang the
    /// others.
    pub async fn fan_out(&self) -> Vec<ProviderResult> {
        use IpVersion::{V4, V6};

        let (dual4, dual6, cf4, cf6, sb4, sb6, info4, info6, ipify4, ipify6) = tokio::join!(
            self.dual_stack.lookup(V4),
            self.dual_stack.lookup(V6),
            self.cloudflare.lookup(V4),
            self.cloudflare.lookup(V6),
            self.ipsb.lookup(V4),
            self.ipsb.lookup(V6),
            self.ipinfo.lookup(V4),
            self.ipinfo.lookup(V6),
            self.ipify.lookup(V4),
            self.ipify.lookup(V6),
        );
        vec![
            dual4, dual6, cf4, cf6, sb4, sb6, info4, info6, ipify4, ipify6,
        ]
    }
}

pub fn find(
    results: &[ProviderResult],
    provider: ProviderId,
    version: IpVersion,
) -> Option<&ProviderResult> {
    results
        .iter()
        .find(|r| r.provider == provider && r.version == version)
}
