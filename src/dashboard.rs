//! Terminal rendering of the `check` report.
//!
//! The report has the same blocks as the web dashboard: the address the
//! reporter saw with its location, then one row per provider slot.

use std::fmt::Write;

use yansi::Paint;

use crate::{
    location::{ClientLocation, UNKNOWN},
    lookup::{IpVersion, Outcome, ProviderGeo, ProviderId, ProviderResult, find},
};

const OTHER_PROVIDERS: [ProviderId; 3] = [ProviderId::Cloudflare, ProviderId::IpInfo, ProviderId::Ipify];

pub fn layout(location: &ClientLocation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title(&format!("You are visiting via {}", location.protocol())));
    let _ = writeln!(out, "  {}", location.ip.bold());
    let _ = writeln!(out);

    let geo = &location.geo;
    let coordinates = geo.coordinates();
    let items = [
        geo_item("Country", Some(&geo.country_name)),
        geo_item("Region", Some(&geo.region_name)),
        geo_item("City", Some(&geo.city_name)),
        geo_item("ASN", Some(&geo.asn)),
        geo_item("Coordinates", coordinates.as_ref()),
    ];
    panel(&mut out, "GEO Info", items);
    out
}

pub fn slots(results: &[ProviderResult]) -> String {
    let mut out = String::new();

    section(&mut out, "Domestic IP", results, ProviderId::DualStack);
    section(&mut out, "International IP", results, ProviderId::IpSb);

    let geo = find(results, ProviderId::IpSb, IpVersion::V4).and_then(|r| r.geo.as_ref());
    if let Some(geo) = geo {
        out.push_str(&provider_geo(geo));
    }

    let _ = writeln!(out, "{}", title("Other providers"));
    for provider in OTHER_PROVIDERS {
        let _ = writeln!(
            out,
            "  {:<12} IPv4 {}  IPv6 {}",
            provider.to_string(),
            slot_of(results, provider, IpVersion::V4),
            slot_of(results, provider, IpVersion::V6),
        );
    }
    out
}

/// How one settled lookup is shown.
pub fn slot(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Blocked => "blocked, check firewall or proxy".red().to_string(),
        Outcome::Error => "unsupported".dim().to_string(),
        Outcome::Timeout => "timeout".yellow().to_string(),
        Outcome::Ok(ip) => ip.green().to_string(),
    }
}

pub fn provider_geo(geo: &ProviderGeo) -> String {
    let field = |key: &str| geo.get(key);
    let items = [
        geo_item("Country", field("country")),
        geo_item("Region", field("region")),
        geo_item("City", field("city")),
        geo_item("ISP", field("isp")),
        geo_item("ASN", field("asn")),
        geo_item("Organization", field("organization")),
    ];
    let mut out = String::new();
    panel(&mut out, "IP.SB GEO Info", items);
    out
}

pub fn error_panel(message: &str) -> String {
    format!(
        "{} {}\n  Run `myip check` again to reload.\n",
        "!".red().bold(),
        message.red()
    )
}

fn section(out: &mut String, name: &str, results: &[ProviderResult], provider: ProviderId) {
    let _ = writeln!(out, "{}", title(&format!("{name} ({provider})")));
    for version in [IpVersion::V4, IpVersion::V6] {
        let _ = writeln!(out, "  {:<5} {}", version.to_string(), slot_of(results, provider, version));
    }
    let _ = writeln!(out);
}

fn slot_of(results: &[ProviderResult], provider: ProviderId, version: IpVersion) -> String {
    match find(results, provider, version) {
        Some(result) => slot(&result.outcome),
        None => "unsupported".dim().to_string(),
    }
}

fn panel<const N: usize>(out: &mut String, name: &str, items: [Option<String>; N]) {
    let _ = writeln!(out, "{}", title(name));
    let mut empty = true;
    for item in items.into_iter().flatten() {
        empty = false;
        let _ = writeln!(out, "  {item}");
    }
    if empty {
        let _ = writeln!(out, "  {}", "no data".dim());
    }
    let _ = writeln!(out);
}

/// Missing and `Unknown` values are left out rather than shown blank.
fn geo_item(label: &str, value: Option<&String>) -> Option<String> {
    let value = value.map(|v| v.trim()).filter(|v| !v.is_empty() && *v != UNKNOWN)?;
    Some(format!("{}{}", format!("{label:<13}").dim(), value))
}

fn title(text: &str) -> String {
    text.bold().underline().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Geo, Protocol};

    fn result(provider: ProviderId, version: IpVersion, outcome: Outcome) -> ProviderResult {
        ProviderResult {
            provider,
            version,
            outcome,
            geo: None,
        }
    }

    #[test]
    fn slot_maps_every_sentinel() {
        assert!(slot(&Outcome::Blocked).contains("blocked"));
        assert!(slot(&Outcome::Error).contains("unsupported"));
        assert!(slot(&Outcome::Timeout).contains("timeout"));
        assert!(slot(&Outcome::Ok("203.0.113.5".into())).contains("203.0.113.5"));
    }

    #[test]
    fn layout_omits_unknown_geo() {
        let location = ClientLocation {
            ip: String::from("203.0.113.5"),
            protocol: Some(Protocol::IPv4),
            geo: Geo {
                city_name: String::from("Osaka"),
                ..Geo::default()
            },
            timestamp: 0,
        };
        let rendered = layout(&location);
        assert!(rendered.contains("You are visiting via IPv4"));
        assert!(rendered.contains("203.0.113.5"));
        assert!(rendered.contains("Osaka"));
        assert!(!rendered.contains("Country"));
        assert!(!rendered.contains("Coordinates"));
        assert!(!rendered.contains(UNKNOWN));
    }

    #[test]
    fn provider_geo_without_fields_says_no_data() {
        let mut geo = ProviderGeo::new();
        geo.insert("ip".into(), "203.0.113.9".into());
        geo.insert("country".into(), UNKNOWN.into());
        let rendered = provider_geo(&geo);
        assert!(rendered.contains("no data"));
        assert!(!rendered.contains("Country"));
    }

    #[test]
    fn slots_render_ipsb_geo_from_ipv4() {
        let mut geo = ProviderGeo::new();
        geo.insert("isp".into(), "KDDI".into());
        geo.insert("organization".into(), "".into());
        let mut sb4 = result(ProviderId::IpSb, IpVersion::V4, Outcome::Ok("203.0.113.9".into()));
        sb4.geo = Some(geo);
        let results = vec![
            sb4,
            result(ProviderId::IpSb, IpVersion::V6, Outcome::Timeout),
            result(ProviderId::Cloudflare, IpVersion::V4, Outcome::Blocked),
        ];

        let rendered = slots(&results);
        assert!(rendered.contains("IP.SB GEO Info"));
        assert!(rendered.contains("KDDI"));
        assert!(!rendered.contains("Organization"));
        assert!(rendered.contains("timeout"));
        assert!(rendered.contains("blocked"));
    }

    #[test]
    fn slots_skip_geo_panel_when_ipv4_failed() {
        let results = vec![result(ProviderId::IpSb, IpVersion::V4, Outcome::Error)];
        assert!(!slots(&results).contains("IP.SB GEO Info"));
    }
}
