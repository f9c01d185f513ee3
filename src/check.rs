use std::io::Write;

use crate::{
    Error, dashboard,
    lookup::{Aggregator, HttpClient, ProviderResult, own_location},
};

/// How a `check` run ended.
#[derive(Debug)]
pub enum Report {
    /// The reporter answered and all ten provider slots settled.
    Complete(Vec<ProviderResult>),
    /// The reporter could not be reached; no provider was queried.
    Unreachable,
}

/// Renders the base layout from the reporter's answer, then fills in every
/// provider slot once the fan-out settles.
pub async fn run<W: Write>(
    client: &HttpClient,
    aggregator: &Aggregator<'_>,
    reporter_url: &str,
    out: &mut W,
) -> Result<Report, Error> {
    let location = match own_location(client, reporter_url).await {
        Ok(location) => location,
        Err(err) => {
            error!("Error: {}", err);
            let message = match err {
                Error::ReporterStatus(_) => String::from("failed to get IP info"),
                err => format!("could not connect to server: {err}"),
            };
            out.write_all(dashboard::error_panel(&message).as_bytes())?;
            return Ok(Report::Unreachable);
        }
    };
    out.write_all(dashboard::layout(&location).as_bytes())?;
    out.flush()?;

    let results = aggregator.fan_out().await;
    out.write_all(dashboard::slots(&results).as_bytes())?;
    out.flush()?;
    Ok(Report::Complete(results))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::lookup::{Endpoints, IpVersion, Outcome, ProviderId, find};

    fn pointed_at<'a>(client: &'a HttpClient, server: &MockServer) -> Aggregator<'a> {
        let base = server.uri();
        let at = |name: &str| {
            Endpoints::new(format!("{base}/{name}/v4"), format!("{base}/{name}/v6"))
        };
        let defaults = Aggregator::new(client);
        Aggregator {
            dual_stack: defaults.dual_stack.with_endpoints(at("dual")),
            cloudflare: defaults.cloudflare.with_endpoints(at("trace")),
            ipsb: defaults.ipsb.with_endpoints(at("geoip")),
            ipinfo: defaults.ipinfo.with_endpoints(at("ipinfo")),
            ipify: defaults.ipify.with_endpoints(at("ipify")),
        }
    }

    /// Fails the test on drop if any provider endpoint was hit.
    async fn forbid_providers(server: &MockServer) {
        Mock::given(path_regex(r"^/(dual|trace|geoip|ipinfo|ipify)/v[46]$"))
            .respond_with(ResponseTemplate::new(200).set_body_string("198.51.100.99"))
            .expect(0)
            .named("provider endpoints")
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn unreachable_reporter_shows_error_panel_only() {
        let providers = MockServer::start().await;
        forbid_providers(&providers).await;

        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let aggregator = pointed_at(&client, &providers);
        let mut out = Vec::new();

        let report = run(&client, &aggregator, "http://127.0.0.1:1/ip", &mut out)
            .await
            .unwrap();

        assert!(matches!(report, Report::Unreachable));
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("could not connect to server"));
        assert!(rendered.contains("again to reload"));
        assert!(!rendered.contains("You are visiting via"));
        providers.verify().await;
    }

    #[tokio::test]
    async fn reporter_error_status_shows_error_panel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status":"error","code":500,"message":"Internal Server Error","timestamp":1}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        forbid_providers(&server).await;

        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let aggregator = pointed_at(&client, &server);
        let mut out = Vec::new();

        let report = run(&client, &aggregator, &format!("{}/ip", server.uri()), &mut out)
            .await
            .unwrap();

        assert!(matches!(report, Report::Unreachable));
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("failed to get IP info"));
        server.verify().await;
    }

    #[tokio::test]
    async fn full_run_renders_layout_then_slots() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status":"success","code":200,"data":{"ip":"198.51.100.7","protocol":"IPv4","geo":{"countryName":"Japan","latitude":"35.6895","longitude":"139.6917"},"timestamp":1}}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/geoip/v4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"ip":"198.51.100.7","isp":"Example ISP"}"#),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let aggregator = pointed_at(&client, &server);
        let mut out = Vec::new();

        let report = run(&client, &aggregator, &format!("{}/ip", server.uri()), &mut out)
            .await
            .unwrap();

        let Report::Complete(results) = report else {
            panic!("expected a complete report");
        };
        assert_eq!(results.len(), 10);
        let sb4 = find(&results, ProviderId::IpSb, IpVersion::V4).unwrap();
        assert_eq!(sb4.outcome, Outcome::Ok(String::from("198.51.100.7")));
        let unmatched = results
            .iter()
            .filter(|r| r.outcome == Outcome::Error)
            .count();
        assert_eq!(unmatched, 9);

        let rendered = String::from_utf8(out).unwrap();
        let layout_at = rendered.find("You are visiting via IPv4").unwrap();
        let slots_at = rendered.find("Domestic IP").unwrap();
        assert!(layout_at < slots_at);
        assert!(rendered.contains("35.69, 139.69"));
        assert!(rendered.contains("Example ISP"));
    }
}
