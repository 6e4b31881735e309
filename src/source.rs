//! Exit node list fetching and parsing.

use crate::config::SourceConfig;
use crate::error::FetchError;
use regex::Regex;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Deduplicated set of IPv4 address strings, preserving first-seen order.
///
/// Addresses are kept as strings rather than `IpAddr`: the feed filter is a
/// digit-shape match only (see [`parse_address_list`]), so entries like
/// `999.1.1.1` are representable here even though they never parse as real
/// addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressSet {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl AddressSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an address. Returns false if it was already present.
    pub fn insert(&mut self, addr: String) -> bool {
        if self.index.insert(addr.clone()) {
            self.ordered.push(addr);
            true
        } else {
            false
        }
    }

    /// Membership test.
    pub fn contains(&self, addr: &str) -> bool {
        self.index.contains(addr)
    }

    /// Addresses in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True if the set holds no addresses.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl FromIterator<String> for AddressSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for addr in iter {
            set.insert(addr);
        }
        set
    }
}

/// Parse a newline-delimited exit node list into an [`AddressSet`].
///
/// Keeps only lines that are a full-string IPv4 literal: four dot-separated
/// groups of 1-3 digits. No octet range check is performed (`999.1.1.1`
/// passes), matching the feed's published consumption pattern. Anything
/// else is silently dropped.
pub fn parse_address_list(body: &str) -> AddressSet {
    let pattern = Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap();

    body.lines()
        .map(str::trim)
        .filter(|line| pattern.is_match(line))
        .map(str::to_string)
        .collect()
}

/// Client for the exit node list feed.
pub struct SourceClient {
    config: SourceConfig,
    client: Client,
}

impl SourceClient {
    /// Create a new feed client.
    pub fn new(config: SourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    /// Fetch and parse the desired address set.
    ///
    /// Any network, timeout, or non-2xx failure aborts the pass; a partial
    /// desired set is never used.
    pub async fn fetch_desired(&self) -> Result<AddressSet, FetchError> {
        debug!(url = %self.config.url, "Fetching exit node list");

        let response = self.client.get(&self.config.url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, detail });
        }

        let body = response.text().await?;
        let desired = parse_address_list(&body);

        info!(addresses = desired.len(), "Exit node list loaded");

        Ok(desired)
    }
}
