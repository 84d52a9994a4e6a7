//! Conversion between [`StackValue`] and the engine wire representation.

use everscale_types::boc::Boc;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::MarshalError;
use crate::stack::StackValue;

/// Stack entry in the form accepted and produced by the engine.
///
/// Serialized as `{"type": "...", "value": ...}` where cells and slices are
/// base64-encoded BOCs and integers are decimal strings.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWireEntry", into = "RawWireEntry")]
pub enum WireStackEntry {
    Null,
    Int(String),
    Cell(String),
    CellSlice(String),
    Tuple(Vec<WireStackEntry>),
    /// Entry with a type tag outside of the supported set.
    Unsupported(String),
}

impl WireStackEntry {
    const TAG_NULL: &'static str = "null";
    const TAG_INT: &'static str = "int";
    const TAG_CELL: &'static str = "cell";
    const TAG_SLICE: &'static str = "cell_slice";
    const TAG_TUPLE: &'static str = "tuple";

    pub fn tag(&self) -> &str {
        match self {
            Self::Null => Self::TAG_NULL,
            Self::Int(_) => Self::TAG_INT,
            Self::Cell(_) => Self::TAG_CELL,
            Self::CellSlice(_) => Self::TAG_SLICE,
            Self::Tuple(_) => Self::TAG_TUPLE,
            Self::Unsupported(tag) => tag,
        }
    }
}

/// Converts native stack values into the engine representation.
pub fn forward(values: &[StackValue]) -> Vec<WireStackEntry> {
    values.iter().map(forward_value).collect()
}

pub fn forward_value(value: &StackValue) -> WireStackEntry {
    match value {
        StackValue::Null => WireStackEntry::Null,
        StackValue::Int(int) => WireStackEntry::Int(int.to_str_radix(10)),
        StackValue::Cell(cell) => WireStackEntry::Cell(Boc::encode_base64(cell)),
        StackValue::Slice(cell) => WireStackEntry::CellSlice(Boc::encode_base64(cell)),
        StackValue::Tuple(items) => WireStackEntry::Tuple(forward(items)),
    }
}

/// Converts engine stack entries back into native stack values.
pub fn backward(entries: &[WireStackEntry]) -> Result<Vec<StackValue>, MarshalError> {
    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        values.push(ok!(backward_value(entry)));
    }
    Ok(values)
}

pub fn backward_value(entry: &WireStackEntry) -> Result<StackValue, MarshalError> {
    Ok(match entry {
        WireStackEntry::Null => StackValue::Null,
        WireStackEntry::Int(value) => match value.parse::<BigInt>() {
            Ok(int) => StackValue::Int(int),
            Err(_) => return Err(MarshalError::InvalidInt(value.clone())),
        },
        WireStackEntry::Cell(value) => StackValue::Cell(ok!(decode_cell(value))),
        WireStackEntry::CellSlice(value) => StackValue::Slice(ok!(decode_cell(value))),
        WireStackEntry::Tuple(items) => StackValue::Tuple(ok!(backward(items))),
        WireStackEntry::Unsupported(tag) => {
            return Err(MarshalError::UnsupportedStackType(tag.clone()))
        }
    })
}

fn decode_cell(value: &str) -> Result<everscale_types::cell::Cell, MarshalError> {
    Boc::decode_base64(value).map_err(MarshalError::InvalidBoc)
}

#[derive(Serialize, Deserialize)]
struct RawWireEntry {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<RawWireValue>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawWireValue {
    Text(String),
    Items(Vec<WireStackEntry>),
    Other(serde_json::Value),
}

impl TryFrom<RawWireEntry> for WireStackEntry {
    type Error = String;

    fn try_from(raw: RawWireEntry) -> Result<Self, Self::Error> {
        fn text(ty: &str, value: Option<RawWireValue>) -> Result<String, String> {
            match value {
                Some(RawWireValue::Text(text)) => Ok(text),
                _ => Err(format!("`{ty}` entry requires a string value")),
            }
        }

        Ok(match raw.ty.as_str() {
            Self::TAG_NULL => Self::Null,
            Self::TAG_INT => Self::Int(text(&raw.ty, raw.value)?),
            Self::TAG_CELL => Self::Cell(text(&raw.ty, raw.value)?),
            Self::TAG_SLICE => Self::CellSlice(text(&raw.ty, raw.value)?),
            Self::TAG_TUPLE => match raw.value {
                Some(RawWireValue::Items(items)) => Self::Tuple(items),
                _ => return Err("`tuple` entry requires an array value".to_owned()),
            },
            _ => Self::Unsupported(raw.ty.clone()),
        })
    }
}

impl From<WireStackEntry> for RawWireEntry {
    fn from(entry: WireStackEntry) -> Self {
        let ty = entry.tag().to_owned();
        let value = match entry {
            WireStackEntry::Null | WireStackEntry::Unsupported(_) => None,
            WireStackEntry::Int(value)
            | WireStackEntry::Cell(value)
            | WireStackEntry::CellSlice(value) => Some(RawWireValue::Text(value)),
            WireStackEntry::Tuple(items) => Some(RawWireValue::Items(items)),
        };
        Self { ty, value }
    }
}

#[cfg(test)]
mod tests {
    use everscale_types::prelude::*;
    use tracing_test::traced_test;

    use super::*;
    use crate::tests::make_cell;
    use crate::tuple;

    fn nested(depth: usize) -> StackValue {
        let mut value = StackValue::int(-42);
        for i in 0..depth {
            value = StackValue::Tuple(vec![StackValue::int(i as u32), value, StackValue::Null]);
        }
        value
    }

    #[test]
    #[traced_test]
    fn round_trip_preserves_values() {
        let child = make_cell(0xdeadbeef);
        let mut b = CellBuilder::new();
        b.store_u64(123).unwrap();
        b.store_reference(child.clone()).unwrap();
        let cell = b.build().unwrap();

        let huge = "-115792089237316195423570985008687907853269984665640564039457584007913129639936"
            .parse::<BigInt>()
            .unwrap();

        let values = tuple![
            int 0,
            int -1,
            int 1,
            raw StackValue::Int(huge),
            null,
            cell cell.clone(),
            slice cell.clone(),
            cell Cell::empty_cell(),
            [],
            raw nested(5),
        ];

        for value in &values {
            let single = std::slice::from_ref(value);
            assert_eq!(backward(&forward(single)).unwrap(), single);
        }
        assert_eq!(backward(&forward(&values)).unwrap(), values);
    }

    #[test]
    fn integers_are_decimal_text() {
        let wire = forward(&tuple![int 0x076ef1ea, int -15, int 0]);
        assert_eq!(
            wire,
            vec![
                WireStackEntry::Int("124711402".to_owned()),
                WireStackEntry::Int("-15".to_owned()),
                WireStackEntry::Int("0".to_owned()),
            ]
        );
    }

    #[test]
    fn cells_are_base64_boc() {
        let cell = make_cell(1);
        let wire = forward(&tuple![cell cell.clone(), slice cell.clone()]);

        let WireStackEntry::Cell(encoded) = &wire[0] else {
            panic!("expected cell entry");
        };
        assert_eq!(Boc::decode_base64(encoded).unwrap(), cell);
        assert_eq!(wire[1], WireStackEntry::CellSlice(encoded.clone()));
    }

    #[test]
    fn json_shape_matches_engine() {
        let cell = Cell::empty_cell();
        let encoded = Boc::encode_base64(&cell);
        let wire = forward(&tuple![int -7, null, slice cell.clone(), [cell cell]]);

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "type": "int", "value": "-7" },
                { "type": "null" },
                { "type": "cell_slice", "value": encoded },
                { "type": "tuple", "value": [{ "type": "cell", "value": encoded }] },
            ])
        );

        let parsed: Vec<WireStackEntry> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, wire);
    }

    #[test]
    fn unsupported_tags_are_rejected() {
        let parsed: Vec<WireStackEntry> = serde_json::from_str(
            r#"[{ "type": "int", "value": "1" }, { "type": "tuple", "value": [{ "type": "builder", "value": "te6c" }] }]"#,
        )
        .unwrap();

        assert_eq!(
            parsed[1],
            WireStackEntry::Tuple(vec![WireStackEntry::Unsupported("builder".to_owned())])
        );
        assert!(matches!(
            backward(&parsed),
            Err(MarshalError::UnsupportedStackType(tag)) if tag == "builder"
        ));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(matches!(
            backward(&[WireStackEntry::Int("12a".to_owned())]),
            Err(MarshalError::InvalidInt(_))
        ));
        assert!(matches!(
            backward(&[WireStackEntry::Cell("not a boc".to_owned())]),
            Err(MarshalError::InvalidBoc(_))
        ));
        assert!(serde_json::from_str::<WireStackEntry>(r#"{ "type": "int" }"#).is_err());
    }
}
