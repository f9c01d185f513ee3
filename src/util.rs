use axum::http::{HeaderMap, header};

/// Header value as an owned string, `None` when missing, not UTF-8 or blank.
pub fn get_header(headers: &HeaderMap, key: impl header::AsHeaderName) -> Option<String> {
    let value = headers.get(key)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn blank_header_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("x-city", HeaderValue::from_static("  "));
        headers.insert("x-asn", HeaderValue::from_static(" 13335 "));
        assert_eq!(get_header(&headers, "x-city"), None);
        assert_eq!(get_header(&headers, "x-asn").as_deref(), Some("13335"));
        assert_eq!(get_header(&headers, "x-missing"), None);
    }
}
