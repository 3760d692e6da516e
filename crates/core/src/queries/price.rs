//! Price queries

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::{QueryError, QueryResult};

/// Currencies a spot price can be quoted in
pub const CURRENCIES: &[&str] = &["usd", "jpy", "eth", "btc"];

/// Supported asset/currency pairs
pub const SPOT_PRICE_PAIRS: &[&str] = &[
    "ETH/USD", "BTC/USD", "TRB/USD", "OHM/ETH", "VSQ/USD", "BCT/USD", "DAI/USD", "RIC/USD", "MKR/USD",
    "IDLE/USD", "SUSHI/USD", "MATIC/USD", "USDC/USD", "EUR/USD", "PLS/USD", "ETH/JPY", "ALBT/USD", "RAI/USD",
    "XDAI/USD", "ETH/BTC", "AVAX/USD", "AAVE/USD", "BADGER/USD", "BCH/USD", "COMP/USD", "CRV/USD", "DOGE/USD",
    "DOT/USD", "EUL/USD", "FIL/USD", "FRAX/USD", "GNO/USD", "LINK/USD", "LTC/USD", "SHIB/USD", "UNI/USD",
    "USDT/USD", "YFI/USD", "STETH/BTC", "STETH/USD", "SWETH/USD", "RETH/BTC", "RETH/USD", "WSTETH/USD",
    "WSTETH/ETH", "OP/USD", "GRT/USD", "CNY/USD", "BRL/USD", "OUSD/USD", "OETH/ETH", "WLD/USD", "DIVA/USD",
    "CBETH/USD", "WBETH/USD", "OETH/USD", "PYTH/USD", "OGV/ETH", "ORDI/USD", "METH/USD", "WBTC/USD", "MNT/USD",
    "USDY/USD", "WMNT/USD", "PRIMEETH/ETH", "WUSDM/USD", "SDAI/USD", "USDM/USD", "SFRAX/USD", "GYD/USD",
    "LETH/USD", "FRXETH/USD", "SFUEL/USD", "EZETH/USD", "WEETH/USD", "WRSETH/USD", "MODE/USD", "RSETH/USD",
    "TLOS/USD", "ATLA/USD", "TARA/USD",
];

/// True if `asset/currency` is a supported pair. Comparison ignores case.
pub fn is_supported_pair(asset: &str, currency: &str) -> bool {
    SPOT_PRICE_PAIRS.iter().any(|pair| match pair.split_once('/') {
        Some((a, c)) => a.eq_ignore_ascii_case(asset) && c.eq_ignore_ascii_case(currency),
        None => false,
    })
}

/// Lowercase and check an asset/currency pair
fn validated_pair(asset: &str, currency: &str) -> QueryResult<(String, String)> {
    let asset = asset.to_lowercase();
    let currency = currency.to_lowercase();

    if !CURRENCIES.contains(&currency.as_str()) {
        return Err(QueryError::UnsupportedCurrency(currency));
    }
    if !is_supported_pair(&asset, &currency) {
        return Err(QueryError::UnsupportedPair { asset, currency });
    }
    Ok((asset, currency))
}

fn price_value_type() -> ValueType {
    ValueType::ufixed(256, 18)
}

/// Spot price of an asset in a currency
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpotPrice {
    asset: String,
    currency: String,
}

impl SpotPrice {
    pub fn new(asset: &str, currency: &str) -> QueryResult<Self> {
        let (asset, currency) = validated_pair(asset, currency)?;
        Ok(Self { asset, currency })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl QueryVariant for SpotPrice {
    const TYPE_NAME: &'static str = "SpotPrice";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[Param::new("asset", "string"), Param::new("currency", "string")];

    fn param_values(&self) -> Vec<Value> {
        vec![Value::from(self.asset.as_str()), Value::from(self.currency.as_str())]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let asset = params.string()?;
        let currency = params.string()?;
        Self::new(&asset, &currency)
    }

    fn value_type(&self) -> ValueType {
        price_value_type()
    }
}

/// Time weighted average price over `timespan` seconds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Twap {
    asset: String,
    currency: String,
    timespan: u64,
}

impl Twap {
    pub fn new(asset: &str, currency: &str, timespan: u64) -> QueryResult<Self> {
        let (asset, currency) = validated_pair(asset, currency)?;
        Ok(Self {
            asset,
            currency,
            timespan,
        })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn timespan(&self) -> u64 {
        self.timespan
    }
}

impl QueryVariant for Twap {
    const TYPE_NAME: &'static str = "TWAP";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[
        Param::new("asset", "string"),
        Param::new("currency", "string"),
        Param::new("timespan", "uint256"),
    ];

    fn param_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.asset.as_str()),
            Value::from(self.currency.as_str()),
            Value::from(self.timespan),
        ]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let asset = params.string()?;
        let currency = params.string()?;
        let timespan = params.u64()?;
        Self::new(&asset, &currency, timespan)
    }

    fn value_type(&self) -> ValueType {
        price_value_type()
    }
}

/// Price of a non-standard asset, qualified by an identifier and unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomPrice {
    pub identifier: String,
    pub asset: String,
    pub currency: String,
    pub unit: String,
}

impl CustomPrice {
    pub fn new(identifier: &str, asset: &str, currency: &str, unit: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            asset: asset.to_lowercase(),
            currency: currency.to_lowercase(),
            unit: unit.to_string(),
        }
    }
}

impl QueryVariant for CustomPrice {
    const TYPE_NAME: &'static str = "CustomPrice";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[
        Param::new("identifier", "string"),
        Param::new("asset", "string"),
        Param::new("currency", "string"),
        Param::new("unit", "string"),
    ];

    fn param_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.identifier.as_str()),
            Value::from(self.asset.as_str()),
            Value::from(self.currency.as_str()),
            Value::from(self.unit.as_str()),
        ]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let identifier = params.string()?;
        let asset = params.string()?;
        let currency = params.string()?;
        let unit = params.string()?;
        Ok(Self::new(&identifier, &asset, &currency, &unit))
    }

    fn value_type(&self) -> ValueType {
        price_value_type()
    }
}

/// Annualised volatility of daily returns over `days`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DailyVolatility {
    pub asset: String,
    pub currency: String,
    pub days: u64,
}

impl DailyVolatility {
    pub fn new(asset: &str, currency: &str, days: u64) -> Self {
        Self {
            asset: asset.to_lowercase(),
            currency: currency.to_lowercase(),
            days,
        }
    }
}

impl QueryVariant for DailyVolatility {
    const TYPE_NAME: &'static str = "DailyVolatility";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[
        Param::new("asset", "string"),
        Param::new("currency", "string"),
        Param::new("days", "uint256"),
    ];

    fn param_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.asset.as_str()),
            Value::from(self.currency.as_str()),
            Value::from(self.days),
        ]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let asset = params.string()?;
        let currency = params.string()?;
        let days = params.u64()?;
        Ok(Self::new(&asset, &currency, days))
    }

    fn value_type(&self) -> ValueType {
        price_value_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::Query;
    use alloy_primitives::hex;

    #[test]
    fn test_spot_price_descriptor() {
        let q: Query = SpotPrice::new("BTC", "USD").unwrap().into();
        assert_eq!(q.descriptor(), r#"{"type":"SpotPrice","asset":"btc","currency":"usd"}"#);
        assert_eq!(q.value_type(), ValueType::ufixed(256, 18));
    }

    #[test]
    fn test_spot_price_validation() {
        assert!(matches!(
            SpotPrice::new("btc", "gbp"),
            Err(QueryError::UnsupportedCurrency(c)) if c == "gbp"
        ));
        assert!(matches!(
            SpotPrice::new("xyz", "usd"),
            Err(QueryError::UnsupportedPair { .. })
        ));
        // Supported currency, unsupported pairing
        assert!(SpotPrice::new("trb", "jpy").is_err());
    }

    #[test]
    fn test_spot_price_query_ids() {
        let cases = [
            ("btc", "usd", "a6f013ee236804827b77696d350e9f0ac3e879328f2a3021d473a0b778ad78ac"),
            ("ETH", "USD", "83a7f3d48786ac2667503a61e8c415438ed2922eb86a2906e4ee66d9a2ce4992"),
        ];
        for (asset, currency, expected) in cases {
            let q: Query = SpotPrice::new(asset, currency).unwrap().into();
            assert_eq!(hex::encode(q.query_id().unwrap()), expected, "{}/{}", asset, currency);
        }
    }

    #[test]
    fn test_twap_query_ids() {
        let cases = [
            ("btc", "USD", "18043d2ec387f70a62430753cb717e4f0c8a4de5344c75b3cd8bc65147c7c4c6"),
            ("vsq", "usd", "2b717a1b27bcee009f8190a78092c2de595566d5998f7ac18cd9d8efd27e24c0"),
            ("bct", "usd", "7d959edc69b5c9851ce030eb33d3848451b9636f2ec836158c6450309577f100"),
        ];
        for (asset, currency, expected) in cases {
            let q: Query = Twap::new(asset, currency, 86400).unwrap().into();
            assert_eq!(hex::encode(q.query_id().unwrap()), expected, "{}/{}", asset, currency);
        }
    }

    #[test]
    fn test_twap_value_round_trip() {
        let q: Query = Twap::new("btc", "usd", 86400).unwrap().into();
        assert_eq!(q.descriptor(), r#"{"type":"TWAP","asset":"btc","currency":"usd","timespan":86400}"#);

        let value_type = q.value_type();
        let encoded = value_type.encode(&Value::Float(12000.0)).unwrap();
        assert_eq!(value_type.decode(&encoded).unwrap(), Value::Float(12000.0));
    }

    #[test]
    fn test_custom_price_lowercases_without_validation() {
        let q = CustomPrice::new("landx", "CORN", "USD", "per_kilogram");
        assert_eq!(q.asset, "corn");
        assert_eq!(q.currency, "usd");
        assert_eq!(q.unit, "per_kilogram");
    }

    #[test]
    fn test_reconstruction_revalidates() {
        let data = crate::queries::abi::encode_envelope(
            "SpotPrice",
            crate::queries::abi::encode_params(
                SpotPrice::PARAMS,
                vec![Value::from("btc"), Value::from("gbp")],
            )
            .unwrap(),
        );
        assert!(matches!(
            Query::from_query_data(&data),
            Err(QueryError::UnsupportedCurrency(_))
        ));
    }
}
