//! ABI of the storage contract.

use alloy::primitives::{Bytes, U256};
use alloy::sol;
use alloy::sol_types::{sol_data, SolCall, SolType};

sol! {
    /// Single-slot integer storage.
    interface SimpleStorage {
        function getValue() external view returns (uint256);
        function setValue(uint256 newValue) external;
    }
}

/// Calldata for `getValue()`.
pub fn get_value_calldata() -> Bytes {
    SimpleStorage::getValueCall {}.abi_encode().into()
}

/// Calldata for `setValue(value)`.
pub fn set_value_calldata(value: U256) -> Bytes {
    SimpleStorage::setValueCall { newValue: value }
        .abi_encode()
        .into()
}

/// Decode the `uint256` returned by `getValue()`.
pub fn decode_value(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    <sol_data::Uint<256> as SolType>::abi_decode(data)
}

/// Parse user input as a non-negative decimal `uint256`.
pub fn parse_value(input: &str) -> Result<U256, String> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{input}' is not a non-negative integer"));
    }
    U256::from_str_radix(input, 10).map_err(|_| format!("'{input}' does not fit in uint256"))
}
