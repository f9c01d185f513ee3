use super::{
    IpVersion, Outcome, ProviderId, ProviderResult,
    http_client::HttpClient,
    parser::{GeoJsonParser, IpLookupParser, JsonIpParser, PlainTextIpParser, TraceParser},
};

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub v4: String,
    pub v6: String,
}

impl Endpoints {
    pub fn new(v4: impl Into<String>, v6: impl Into<String>) -> Self {
        Self {
            v4: v4.into(),
            v6: v6.into(),
        }
    }

    fn get(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::V4 => &self.v4,
            IpVersion::V6 => &self.v6,
        }
    }
}

/// One provider: an endpoint per IP version and a parser for its body.
pub struct HttpIpLookup<'a, P> {
    client: &'a HttpClient,
    id: ProviderId,
    endpoints: Endpoints,
    parser: P,
}

impl<'a, P> HttpIpLookup<'a, P>
where
    P: IpLookupParser,
{
    pub fn new(client: &'a HttpClient, id: ProviderId, endpoints: Endpoints, parser: P) -> Self {
        Self {
            client,
            id,
            endpoints,
            parser,
        }
    }

    #[cfg(test)]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub async fn lookup(&self, version: IpVersion) -> ProviderResult {
        let url = self.endpoints.get(version);
        let (outcome, geo) = match self.client.fetch(url).await {
            Ok(body) => {
                let parsed = self.parser.parse(&body);
                let outcome = parsed.ip.map_or(Outcome::Error, Outcome::Ok);
                (outcome, parsed.geo)
            }
            Err(err) => (Outcome::from(err), None),
        };
        debug!("{} {}: {:?}", self.id, version, outcome);
        ProviderResult {
            provider: self.id,
            version,
            outcome,
            geo,
        }
    }
}

impl<'a> HttpIpLookup<'a, JsonIpParser> {
    pub fn dual_stack(client: &'a HttpClient) -> Self {
        Self::new(
            client,
            ProviderId::DualStack,
            Endpoints::new(
                "https://v4.yinghualuo.cn/bejson",
                "https://v6.yinghualuo.cn/bejson",
            ),
            JsonIpParser::with_raw_fallback(),
        )
    }

    pub fn ipify(client: &'a HttpClient) -> Self {
        Self::new(
            client,
            ProviderId::Ipify,
            Endpoints::new(
                "https://api.ipify.org/?format=json",
                "https://api64.ipify.org/?format=json",
            ),
            JsonIpParser::default(),
        )
    }
}

impl<'a> HttpIpLookup<'a, TraceParser> {
    pub fn cloudflare(client: &'a HttpClient) -> Self {
        Self::new(
            client,
            ProviderId::Cloudflare,
            Endpoints::new(
                "https://1.1.1.1/cdn-cgi/trace",
                "https://[2606:4700:4700::1111]/cdn-cgi/trace",
            ),
            TraceParser,
        )
    }
}

impl<'a> HttpIpLookup<'a, GeoJsonParser> {
    pub fn ipsb(client: &'a HttpClient) -> Self {
        Self::new(
            client,
            ProviderId::IpSb,
            Endpoints::new(
                "https://api-ipv4.ip.sb/geoip",
                "https://api-ipv6.ip.sb/geoip",
            ),
            GeoJsonParser,
        )
    }
}

impl<'a> HttpIpLookup<'a, PlainTextIpParser> {
    pub fn ipinfo(client: &'a HttpClient) -> Self {
        Self::new(
            client,
            ProviderId::IpInfo,
            Endpoints::new("https://ipinfo.io/ip", "https://6.ipinfo.io/ip"),
            PlainTextIpParser,
        )
    }
}
