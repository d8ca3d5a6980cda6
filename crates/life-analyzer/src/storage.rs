//! Blob storage listing over the REST API.

use crate::sas::{self, SharedKey};
use chrono::{Duration, Utc};
use life_core::{Error, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Well-known local emulator account
const DEV_ACCOUNT: &str = "devstoreaccount1";
const DEV_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Listing requests are authorized with an account SAS this long-lived
const LISTING_SAS_MINUTES: i64 = 15;

/// The parts of a storage connection string the analyzer uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    pub account_key: String,
    pub blob_endpoint: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut development = false;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                Error::InvalidConfig(format!("malformed connection string segment: {}", part))
            })?;

            match name {
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "EndpointSuffix" => suffix = value.to_string(),
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "UseDevelopmentStorage" => development = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            return Ok(Self {
                account_name: account_name.unwrap_or_else(|| DEV_ACCOUNT.to_string()),
                account_key: account_key.unwrap_or_else(|| DEV_KEY.to_string()),
                blob_endpoint: blob_endpoint.unwrap_or_else(|| DEV_BLOB_ENDPOINT.to_string()),
            });
        }

        let account_name = account_name
            .ok_or_else(|| Error::InvalidConfig("connection string has no AccountName".to_string()))?;
        let account_key = account_key
            .ok_or_else(|| Error::InvalidConfig("connection string has no AccountKey".to_string()))?;
        let blob_endpoint = blob_endpoint
            .unwrap_or_else(|| format!("{}://{}.blob.{}", protocol, account_name, suffix));

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResults {
    #[serde(default)]
    containers: Option<ItemList>,
    #[serde(default)]
    blobs: Option<ItemList>,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemList {
    #[serde(rename = "Container", alias = "Blob", default)]
    items: Vec<NamedItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NamedItem {
    name: String,
}

/// One page of a listing: item names plus the marker for the next page
#[derive(Debug, PartialEq, Eq)]
pub struct ListPage {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

/// Parse an `EnumerationResults` body from either list operation
pub fn parse_list_page(xml: &str) -> Result<ListPage> {
    let xml = xml.trim_start_matches('\u{feff}');
    let results: EnumerationResults =
        quick_xml::de::from_str(xml).map_err(|e| Error::Serialization(e.to_string()))?;

    let items = results
        .containers
        .or(results.blobs)
        .unwrap_or_default()
        .items;

    Ok(ListPage {
        names: items.into_iter().map(|item| item.name).collect(),
        next_marker: results.next_marker.filter(|m| !m.trim().is_empty()),
    })
}

pub struct BlobServiceClient {
    http_client: Client,
    key: SharedKey,
    endpoint: Url,
    sas_ttl: Duration,
}

impl BlobServiceClient {
    pub fn new(connection: &ConnectionString, http_client: Client, sas_ttl: Duration) -> Result<Self> {
        let key = SharedKey::new(&connection.account_name, &connection.account_key)?;
        let endpoint = Url::parse(&connection.blob_endpoint).map_err(|e| {
            Error::InvalidConfig(format!("invalid blob endpoint {}: {}", connection.blob_endpoint, e))
        })?;

        Ok(Self {
            http_client,
            key,
            endpoint,
            sas_ttl,
        })
    }

    pub fn from_connection_string(raw: &str, http_client: Client, sas_ttl: Duration) -> Result<Self> {
        Self::new(&ConnectionString::parse(raw)?, http_client, sas_ttl)
    }

    pub fn account_name(&self) -> &str {
        self.key.account()
    }

    /// Endpoint URL with the given path segments appended
    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidConfig(format!("blob endpoint {} cannot hold a path", self.endpoint)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Unsigned URL of a blob
    pub fn blob_url(&self, container: &str, blob: &str) -> Result<Url> {
        self.url_for(&[container, blob])
    }

    /// Blob URL carrying a read-only SAS that expires after the configured TTL
    pub fn signed_blob_url(&self, container: &str, blob: &str) -> Result<Url> {
        let mut url = self.blob_url(container, blob)?;
        let token = sas::blob_read_sas(&self.key, container, blob, Utc::now() + self.sas_ttl);
        token.apply(&mut url);
        Ok(url)
    }

    /// Names of all containers in the account
    #[instrument(skip(self))]
    pub async fn list_containers(&self) -> Result<Vec<String>> {
        let base = self.url_for(&[])?;
        self.list_all(base, &[("comp", "list")]).await
    }

    /// Names of all blobs in `container`
    #[instrument(skip(self))]
    pub async fn list_blobs(&self, container: &str) -> Result<Vec<String>> {
        let base = self.url_for(&[container])?;
        self.list_all(base, &[("restype", "container"), ("comp", "list")]).await
    }

    async fn list_all(&self, base: Url, params: &[(&str, &str)]) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = base.clone();
            {
                let mut query = url.query_pairs_mut();
                for (name, value) in params {
                    query.append_pair(name, value);
                }
                if let Some(marker) = &marker {
                    query.append_pair("marker", marker);
                }
            }
            sas::account_list_sas(&self.key, Utc::now() + Duration::minutes(LISTING_SAS_MINUTES))
                .apply(&mut url);

            let page = parse_list_page(&self.get_text(url).await?)?;
            debug!("Listed {} items", page.names.len());
            names.extend(page.names);

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .header("x-ms-version", sas::SAS_VERSION)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Remote {
                service: "blob storage".to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}
