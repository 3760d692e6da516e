//! Query catalog
//!
//! Registry of human readable tags mapped to query instances.

use alloy_primitives::{hex, Address};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::errors::{CatalogError, CatalogResult, QueryResult};
use crate::queries::{
    AmpleforthCustomSpotPrice, AmpleforthUspce, CustomPrice, DailyVolatility, EvmBalance, GasPriceOracle,
    LegacyRequest, NumericApiResponse, Query, QueryEncoding, Snapshot, SpotPrice, StringQuery, Twap,
};

/// A registered query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub tag: String,
    pub title: String,
    pub query_type: String,
    pub descriptor: String,
    /// `0x` prefixed hex
    pub query_id: String,
    pub active: bool,
    /// JSON parameter schema, empty for text queries
    pub abi: String,
}

impl CatalogEntry {
    /// Rebuild the query this entry was registered with
    pub fn query(&self) -> QueryResult<Query> {
        Query::from_descriptor(&self.descriptor)
    }
}

/// Search criteria for [`Catalog::find`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Substring of the tag
    pub tag: Option<String>,
    /// Case insensitive, `0x` prefix optional
    pub query_id: Option<String>,
    /// Case insensitive
    pub query_type: Option<String>,
    pub active: Option<bool>,
}

impl CatalogFilter {
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }

    pub fn query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = Some(query_type.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        if let Some(tag) = &self.tag {
            if !entry.tag.contains(tag.as_str()) {
                return false;
            }
        }
        if let Some(query_id) = &self.query_id {
            let wanted = query_id
                .strip_prefix("0x")
                .or_else(|| query_id.strip_prefix("0X"))
                .unwrap_or(query_id);
            let have = entry.query_id.strip_prefix("0x").unwrap_or(&entry.query_id);
            if !wanted.eq_ignore_ascii_case(have) {
                return false;
            }
        }
        if let Some(query_type) = &self.query_type {
            if !query_type.eq_ignore_ascii_case(&entry.query_type) {
                return false;
            }
        }
        if let Some(active) = self.active {
            if active != entry.active {
                return false;
            }
        }
        true
    }
}

/// Tag to query registry, in registration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_tag: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a query under a unique tag
    pub fn add_entry(&mut self, tag: &str, title: &str, query: impl Into<Query>, active: bool) -> CatalogResult<()> {
        if self.by_tag.contains_key(tag) {
            return Err(CatalogError::DuplicateTag(tag.to_string()));
        }

        let query = query.into();
        let abi = match query.encoding() {
            QueryEncoding::Abi => serde_json::to_string(query.params()).map_err(|e| CatalogError::Export(e.to_string()))?,
            QueryEncoding::Json => String::new(),
        };

        let entry = CatalogEntry {
            tag: tag.to_string(),
            title: title.to_string(),
            query_type: query.type_name().to_string(),
            descriptor: query.descriptor(),
            query_id: hex::encode_prefixed(query.query_id()?),
            active,
            abi,
        };

        debug!("Registered catalog entry {} ({})", entry.tag, entry.query_id);
        self.by_tag.insert(entry.tag.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Exact lookup by tag
    pub fn get(&self, tag: &str) -> Option<&CatalogEntry> {
        self.by_tag.get(tag).map(|&i| &self.entries[i])
    }

    pub fn find(&self, filter: &CatalogFilter) -> Vec<&CatalogEntry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_markdown(&self) -> CatalogResult<String> {
        let mut lines = vec!["# Query Catalog".to_string(), String::new()];
        for entry in &self.entries {
            let query_data = entry.query()?.query_data()?;
            lines.push(format!("## {}", entry.title));
            lines.push(String::new());
            lines.push("| Parameter | Value |".to_string());
            lines.push("| --- | --- |".to_string());
            lines.push(format!("| Tag | `{}` |", entry.tag));
            lines.push(format!("| Active | `{}` |", entry.active));
            lines.push(format!("| Type | `{}` |", entry.query_type));
            lines.push(format!("| Descriptor | `{}` |", entry.descriptor));
            lines.push(format!("| Encoding ABI | `{}` |", entry.abi));
            lines.push(format!("| Query ID | `{}` |", entry.query_id));
            lines.push(format!("| Query data | `{}` |", hex::encode_prefixed(&query_data)));
            lines.push(String::new());
        }
        Ok(lines.join("\n"))
    }

    pub fn to_yaml(&self) -> CatalogResult<String> {
        serde_yaml::to_string(&self.entries).map_err(|e| CatalogError::Export(e.to_string()))
    }

    pub fn to_json(&self) -> CatalogResult<String> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| CatalogError::Export(e.to_string()))
    }
}

const SPOT_PRICES: &[(&str, &str)] = &[
    ("trb", "usd"),
    ("ohm", "eth"),
    ("vsq", "usd"),
    ("bct", "usd"),
    ("dai", "usd"),
    ("ric", "usd"),
    ("idle", "usd"),
    ("mkr", "usd"),
    ("sushi", "usd"),
    ("matic", "usd"),
    ("usdc", "usd"),
    ("eur", "usd"),
    ("pls", "usd"),
    ("eth", "usd"),
    ("btc", "usd"),
    ("albt", "usd"),
    ("rai", "usd"),
    ("xdai", "usd"),
    ("eth", "btc"),
    ("avax", "usd"),
    ("aave", "usd"),
    ("link", "usd"),
    ("steth", "usd"),
    ("reth", "usd"),
    ("wsteth", "eth"),
    ("op", "usd"),
    ("eth", "jpy"),
    ("wbtc", "usd"),
    ("sdai", "usd"),
    ("frax", "usd"),
    ("tara", "usd"),
];

/// Legacy request ids and what they asked for
const LEGACY_REQUESTS: &[(u64, &str)] = &[
    (1, "ETH/USD"),
    (2, "BTC/USD"),
    (10, "AMPL/USD"),
    (41, "USPCE"),
    (50, "TRB/USD"),
    (59, "ETH/JPY"),
];

/// Build the default catalog
pub fn query_catalog() -> CatalogResult<Catalog> {
    let mut catalog = Catalog::new();

    for (asset, currency) in SPOT_PRICES {
        let tag = format!("{}-{}-spot", asset, currency);
        let title = format!("{}/{} spot price", asset.to_uppercase(), currency.to_uppercase());
        catalog.add_entry(&tag, &title, SpotPrice::new(asset, currency)?, true)?;
    }

    catalog.add_entry(
        "gas-price-oracle-example",
        "Gas Price Oracle Mainnet 7/1/2022",
        GasPriceOracle::new(1, 1656633600),
        true,
    )?;
    catalog.add_entry(
        "snapshot-proposal-example",
        "Snapshot proposal example",
        Snapshot::new("cce9760adea906176940ae5fd05bc007cc9252b524832065800635484cb5cb57"),
        true,
    )?;
    catalog.add_entry(
        "eth-usd-30day_volatility",
        "30-Day ETH/USD volatility",
        DailyVolatility::new("eth", "usd", 30),
        true,
    )?;
    catalog.add_entry(
        "numeric-api-response-example",
        "Numeric API response example",
        NumericApiResponse::new(
            "https://api.coingecko.com/api/v3/simple/price?ids=garlicoin&vs_currencies=usd",
            "garlicoin, usd",
        ),
        true,
    )?;
    catalog.add_entry(
        "string-query-example",
        "String query example",
        StringQuery::new("Where is the Atlantic ocean?"),
        true,
    )?;
    catalog.add_entry(
        "twap-eth-usd-example",
        "Time Weighted Average Price",
        Twap::new("eth", "usd", 86400)?,
        true,
    )?;
    catalog.add_entry("ampleforth-uspce", "USPCE", AmpleforthUspce, true)?;
    catalog.add_entry("ampleforth-custom", "AMPL/USD VWAP", AmpleforthCustomSpotPrice, true)?;

    for asset in ["corn", "rice", "wheat", "soy"] {
        let tag = format!("{}-usd-custom", asset);
        let mut title = asset.to_string();
        title[..1].make_ascii_uppercase();
        let title = format!("{} price in usd per kilogram", title);
        catalog.add_entry(&tag, &title, CustomPrice::new("landx", asset, "usd", "per_kilogram"), true)?;
    }
    catalog.add_entry(
        "brc20-ordi-usd-spot",
        "ORDI/USD spot price",
        CustomPrice::new("brc20", "ordi", "usd", ""),
        true,
    )?;

    const EVM_BALANCE_ADDRESS: Address = Address::new([
        0x21, 0x07, 0x66, 0x22, 0x6c, 0x54, 0xcd, 0xd6, 0xbd, 0x04, 0x01, 0x74, 0x9d, 0x43, 0xe7, 0xa5, 0x58, 0x5e,
        0x38, 0x68,
    ]);
    catalog.add_entry(
        "evm-bal-example",
        "EVM balance example",
        EvmBalance::new(11155111, EVM_BALANCE_ADDRESS, 1706302197),
        true,
    )?;

    for (id, title) in LEGACY_REQUESTS {
        let tag = format!("legacy-request-{}", id);
        catalog.add_entry(&tag, &format!("Legacy {}", title), LegacyRequest::new(*id), false)?;
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut catalog = Catalog::new();
        catalog
            .add_entry("btc-usd-spot", "BTC/USD", SpotPrice::new("btc", "usd").unwrap(), true)
            .unwrap();
        let err = catalog
            .add_entry("btc-usd-spot", "again", SpotPrice::new("eth", "usd").unwrap(), true)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTag(tag) if tag == "btc-usd-spot"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_default_catalog_entries_reparse() {
        let catalog = query_catalog().unwrap();
        assert!(!catalog.is_empty());
        for entry in catalog.entries() {
            let query = entry.query().unwrap();
            assert_eq!(query.descriptor(), entry.descriptor);
            assert_eq!(hex::encode_prefixed(query.query_id().unwrap()), entry.query_id);
            assert_eq!(query.type_name(), entry.query_type);
        }
    }

    #[test]
    fn test_find_by_tag_and_type() {
        let catalog = query_catalog().unwrap();

        let spots = catalog.find(&CatalogFilter::default().tag("-spot").query_type("spotprice"));
        assert!(spots.iter().all(|e| e.query_type == "SpotPrice"));
        assert_eq!(spots.len(), SPOT_PRICES.len());

        let twap = catalog.get("twap-eth-usd-example").unwrap();
        assert_eq!(twap.query_type, "TWAP");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_find_by_query_id() {
        let catalog = query_catalog().unwrap();
        let entry = catalog.get("evm-bal-example").unwrap();
        assert_eq!(
            entry.query_id,
            "0x3be82186770410339e9cb0a3d628b7c92ea898a387deaf94906725643f122f86"
        );

        let bare = entry.query_id.trim_start_matches("0x").to_uppercase();
        let found = catalog.find(&CatalogFilter::default().query_id(bare));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "evm-bal-example");
    }

    #[test]
    fn test_legacy_entries_inactive() {
        let catalog = query_catalog().unwrap();
        let inactive = catalog.find(&CatalogFilter::default().active(false));
        assert_eq!(inactive.len(), LEGACY_REQUESTS.len());
        assert!(inactive.iter().all(|e| e.query_type == "LegacyRequest"));

        let legacy = catalog.get("legacy-request-1").unwrap();
        assert_eq!(
            legacy.query_id,
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_text_queries_have_no_abi() {
        let catalog = query_catalog().unwrap();
        assert_eq!(catalog.get("ampleforth-uspce").unwrap().abi, "");
        assert_eq!(
            catalog.get("btc-usd-spot").unwrap().abi,
            r#"[{"name":"asset","type":"string"},{"name":"currency","type":"string"}]"#
        );
    }

    #[test]
    fn test_exports() {
        let mut catalog = Catalog::new();
        catalog
            .add_entry("eth-usd-spot", "ETH/USD spot price", SpotPrice::new("eth", "usd").unwrap(), true)
            .unwrap();

        let markdown = catalog.to_markdown().unwrap();
        assert!(markdown.starts_with("# Query Catalog"));
        assert!(markdown.contains("## ETH/USD spot price"));
        assert!(markdown.contains("| Tag | `eth-usd-spot` |"));
        assert!(markdown.contains("| Query data | `0x"));

        let yaml = catalog.to_yaml().unwrap();
        assert!(yaml.contains("tag: eth-usd-spot"));

        let json: serde_json::Value = serde_json::from_str(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["query_type"], "SpotPrice");
        assert_eq!(json[0]["active"], true);
    }
}
