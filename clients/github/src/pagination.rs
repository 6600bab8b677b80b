use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use url::Url;

/// Extracts the `rel="next"` URL from a `Link` response header.
///
/// `None` on the last page, on a missing header, or on a link that is not a valid URL.
pub(crate) fn next_page(headers: &HeaderMap<HeaderValue>) -> Option<Url> {
    let link = headers.get(header::LINK)?.to_str().ok()?;
    for part in link.split(',') {
        let part = part.trim();
        if part.contains(r#"rel="next""#) {
            // URL sits between < and >
            let start = part.find('<')? + 1;
            let end = part.find('>')?;
            return Url::parse(&part[start..end]).ok();
        }
    }
    None
}

/// Tests

#[cfg(test)]
fn link_headers(value: &str) -> HeaderMap<HeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(header::LINK, HeaderValue::from_str(value).unwrap());
    headers
}

#[test]
fn next_page_test() {
    let headers = link_headers(
        r#"<https://api.github.com/repos/rg3/youtube-dl/issues?page=2>; rel="next", <https://api.github.com/repos/rg3/youtube-dl/issues?page=30>; rel="last""#,
    );
    let next = next_page(&headers).unwrap();
    assert_eq!(
        next.as_str(),
        "https://api.github.com/repos/rg3/youtube-dl/issues?page=2"
    );
}

#[test]
fn next_page_last_page_test() {
    let headers = link_headers(
        r#"<https://api.github.com/repos/rg3/youtube-dl/issues?page=29>; rel="prev", <https://api.github.com/repos/rg3/youtube-dl/issues?page=1>; rel="first""#,
    );
    assert_eq!(next_page(&headers), None);
}

#[test]
fn next_page_no_header_test() {
    assert_eq!(next_page(&HeaderMap::new()), None);
}

#[test]
fn next_page_malformed_url_test() {
    let headers = link_headers(r#"<not a url>; rel="next""#);
    assert_eq!(next_page(&headers), None);
}
