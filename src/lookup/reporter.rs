use crate::{
    Error,
    location::{ClientLocation, Envelope},
};

use super::http_client::HttpClient;

/// Asks our own reporter which address and location it sees for us.
pub async fn own_location(client: &HttpClient, reporter_url: &str) -> Result<ClientLocation, Error> {
    let url = json_url(reporter_url);
    let body = client.fetch(&url).await?;
    let envelope: Envelope<ClientLocation> = serde_json::from_str(&body)?;
    if !envelope.is_success() {
        return Err(Error::ReporterStatus(envelope.status));
    }
    envelope
        .data
        .ok_or_else(|| Error::ReporterStatus(envelope.status))
}

fn json_url(reporter_url: &str) -> String {
    let separator = if reporter_url.contains('?') { '&' } else { '?' };
    format!("{reporter_url}{separator}type=json")
}
