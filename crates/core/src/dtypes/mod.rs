//! Data types for query parameters and responses

pub mod abi_type;
pub mod fixed;
pub mod value;
pub mod value_type;

pub use abi_type::AbiType;
pub use value::Value;
pub use value_type::ValueType;
