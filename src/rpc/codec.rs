use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Result;

/// Encodes an RPC argument or reply for the wire
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Decodes an RPC argument or reply from the wire
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}
