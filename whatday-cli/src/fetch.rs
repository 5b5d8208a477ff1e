//! Where calendar text comes from.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use url::Url;
use whatday_core::WhatDayError;

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Url(Url),
    File(PathBuf),
}

impl ImportSource {
    /// Anything with an http(s) or webcal scheme is a URL, everything else a
    /// file path. `webcal://` is fetched over https.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Some(rest) = strip_scheme(input, "webcal://") {
            let url = Url::parse(&format!("https://{rest}"))
                .with_context(|| format!("Invalid calendar URL: {input}"))?;
            return Ok(ImportSource::Url(url));
        }

        if strip_scheme(input, "http://").is_some() || strip_scheme(input, "https://").is_some() {
            let url = Url::parse(input).with_context(|| format!("Invalid calendar URL: {input}"))?;
            return Ok(ImportSource::Url(url));
        }

        Ok(ImportSource::File(PathBuf::from(input)))
    }

    pub fn describe(&self) -> String {
        match self {
            ImportSource::Url(url) => url.to_string(),
            ImportSource::File(path) => path.display().to_string(),
        }
    }
}

fn strip_scheme<'a>(input: &'a str, scheme: &str) -> Option<&'a str> {
    let head = input.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &input[scheme.len()..])
}

/// The URL actually requested: the relay prefix followed by the
/// percent-encoded calendar URL, or the calendar URL itself without a relay.
pub fn request_url(relay: Option<&str>, target: &Url) -> Result<Url> {
    let Some(relay) = relay else {
        return Ok(target.clone());
    };

    let encoded: String = url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
    Url::parse(&format!("{relay}{encoded}")).with_context(|| format!("Invalid import relay: {relay}"))
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(format!("whatday/{}", CURRENT_VERSION))
        .build()?)
}

/// Read the calendar text for a source.
pub async fn fetch(source: &ImportSource, relay: Option<&str>) -> Result<String> {
    match source {
        ImportSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Could not read {}", path.display())),
        ImportSource::Url(target) => {
            let url = request_url(relay, target)?;
            tracing::debug!(%url, "Fetching calendar");

            let response = http_client()?
                .get(url)
                .send()
                .await
                .map_err(|e| WhatDayError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                bail!(WhatDayError::Transport(format!("HTTP {}", response.status())));
            }

            let text = response
                .text()
                .await
                .map_err(|e| WhatDayError::Transport(e.to_string()))?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webcal_is_fetched_over_https() {
        let source = ImportSource::parse("webcal://example.com/team.ics").unwrap();
        assert_eq!(
            source,
            ImportSource::Url(Url::parse("https://example.com/team.ics").unwrap())
        );
    }

    #[test]
    fn paths_are_files() {
        assert_eq!(
            ImportSource::parse("~/Downloads/holidays.ics").unwrap(),
            ImportSource::File(PathBuf::from("~/Downloads/holidays.ics"))
        );
    }

    #[test]
    fn relay_gets_the_encoded_url() {
        let target = Url::parse("https://example.com/cal.ics?key=a&b=c").unwrap();
        let url = request_url(Some("https://api.allorigins.win/raw?url="), &target).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fexample.com%2Fcal.ics%3Fkey%3Da%26b%3Dc"
        );
        assert_eq!(url.query_pairs().next().unwrap().1, target.as_str());
    }

    #[test]
    fn no_relay_fetches_directly() {
        let target = Url::parse("https://example.com/cal.ics").unwrap();
        assert_eq!(request_url(None, &target).unwrap(), target);
    }

    #[tokio::test]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.ics");
        std::fs::write(&path, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();

        let text = fetch(&ImportSource::File(path), None).await.unwrap();
        assert!(text.starts_with("BEGIN:VCALENDAR"));
    }
}
