use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::{
    config::HostHeaders,
    location::{ClientLocation, Geo, Protocol, unknown},
    util::get_header,
};

/// Client IP and geo attributes the edge platform attached to a request.
/// Every fact may be missing on its own.
#[derive(Debug, Default, Clone)]
pub struct HostFacts {
    pub client_ip: Option<String>,
    pub asn: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region_name: Option<String>,
    pub city_name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl HostFacts {
    pub fn from_headers(headers: &HeaderMap, names: &HostHeaders) -> Self {
        let get = |name: &String| get_header(headers, name.as_str());
        Self {
            client_ip: get(&names.client_ip),
            asn: get(&names.asn),
            country_name: get(&names.country_name),
            country_code: get(&names.country_code),
            region_name: get(&names.region_name),
            city_name: get(&names.city_name),
            latitude: get(&names.latitude),
            longitude: get(&names.longitude),
        }
    }

    pub fn ip(&self) -> String {
        self.client_ip.clone().unwrap_or_else(unknown)
    }

    pub fn location(&self, timestamp: i64) -> ClientLocation {
        let fact = |value: &Option<String>| value.clone().unwrap_or_else(unknown);
        let ip = self.ip();
        ClientLocation {
            protocol: Some(Protocol::of(&ip)),
            ip,
            geo: Geo {
                asn: fact(&self.asn),
                country_name: fact(&self.country_name),
                country_code_alpha2: fact(&self.country_code),
                region_name: fact(&self.region_name),
                city_name: fact(&self.city_name),
                latitude: fact(&self.latitude),
                longitude: fact(&self.longitude),
            },
            timestamp,
        }
    }
}

impl<S> FromRequestParts<S> for HostFacts
where
    Arc<HostHeaders>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let names = Arc::<HostHeaders>::from_ref(state);
        let mut facts = Self::from_headers(&parts.headers, &names);
        if facts.client_ip.is_none() {
            facts.client_ip = parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_canonical().to_string());
        }
        Ok(facts)
    }
}
