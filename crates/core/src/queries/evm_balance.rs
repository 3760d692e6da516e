//! EVM balance query

use alloy_primitives::Address;

use super::{Param, ParamReader, QueryEncoding, QueryVariant};
use crate::dtypes::{Value, ValueType};
use crate::errors::QueryResult;

/// Native token balance of an address, in wei, at the block closest to
/// `timestamp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmBalance {
    pub chain_id: u64,
    pub evm_address: Address,
    pub timestamp: u64,
}

impl EvmBalance {
    pub fn new(chain_id: u64, evm_address: Address, timestamp: u64) -> Self {
        Self {
            chain_id,
            evm_address,
            timestamp,
        }
    }
}

impl QueryVariant for EvmBalance {
    const TYPE_NAME: &'static str = "EVMBalance";
    const ENCODING: QueryEncoding = QueryEncoding::Abi;
    const PARAMS: &'static [Param] = &[
        Param::new("chainId", "uint256"),
        Param::new("evmAddress", "address"),
        Param::new("timestamp", "uint256"),
    ];

    fn param_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.chain_id),
            Value::from(self.evm_address),
            Value::from(self.timestamp),
        ]
    }

    fn from_params(params: &mut ParamReader) -> QueryResult<Self> {
        let chain_id = params.u64()?;
        let evm_address = params.address()?;
        let timestamp = params.u64()?;
        Ok(Self::new(chain_id, evm_address, timestamp))
    }

    fn value_type(&self) -> ValueType {
        ValueType::uint256()
    }
}
