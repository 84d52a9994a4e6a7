use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall time in seconds.
pub fn now_sec() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or_default()
}

/// Cells as base64-encoded BOC strings.
pub mod serde_boc {
    use everscale_types::boc::Boc;
    use everscale_types::cell::Cell;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cell: &Cell, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Boc::encode_base64(cell))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cell, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Boc::decode_base64(encoded).map_err(Error::custom)
    }
}
