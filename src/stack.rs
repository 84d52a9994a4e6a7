use everscale_types::prelude::*;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::error::StackError;

/// Builds a `Vec<StackValue>` from a compact item list.
///
/// ```
/// # use everscale_emulator::tuple;
/// let stack = tuple![int 1, null, [int -2, null]];
/// assert_eq!(stack.len(), 3);
/// ```
#[macro_export]
macro_rules! tuple {
    ($($tt:tt)*) => {{
        #[allow(unused_mut)]
        let mut items = ::std::vec::Vec::<$crate::stack::StackValue>::new();
        $crate::__tuple_items!(items $($tt)*);
        items
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __tuple_items {
    ($v:ident) => {};
    ($v:ident null $(, $($tail:tt)*)?) => {
        $v.push($crate::stack::StackValue::Null);
        $($crate::__tuple_items!($v $($tail)*);)?
    };
    ($v:ident [$($inner:tt)*] $(, $($tail:tt)*)?) => {
        $v.push($crate::stack::StackValue::Tuple($crate::tuple!($($inner)*)));
        $($crate::__tuple_items!($v $($tail)*);)?
    };
    ($v:ident int $value:expr $(, $($tail:tt)*)?) => {
        $v.push($crate::stack::StackValue::int($value));
        $($crate::__tuple_items!($v $($tail)*);)?
    };
    ($v:ident cell $value:expr $(, $($tail:tt)*)?) => {
        $v.push($crate::stack::StackValue::Cell($value));
        $($crate::__tuple_items!($v $($tail)*);)?
    };
    ($v:ident slice $value:expr $(, $($tail:tt)*)?) => {
        $v.push($crate::stack::StackValue::Slice($value));
        $($crate::__tuple_items!($v $($tail)*);)?
    };
    ($v:ident raw $value:expr $(, $($tail:tt)*)?) => {
        $v.push($value);
        $($crate::__tuple_items!($v $($tail)*);)?
    };
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StackValueType {
    Null,
    Int,
    Cell,
    Slice,
    Tuple,
}

/// Stack value as seen by the caller.
///
/// Slices are tracked at the whole cell granularity, the cursor
/// position is not preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    Null,
    Int(BigInt),
    Cell(Cell),
    Slice(Cell),
    Tuple(Vec<StackValue>),
}

impl StackValue {
    pub fn int<T: Into<BigInt>>(value: T) -> Self {
        Self::Int(value.into())
    }

    pub fn bool(value: bool) -> Self {
        Self::Int(if value { BigInt::from(-1) } else { BigInt::zero() })
    }

    pub fn ty(&self) -> StackValueType {
        match self {
            Self::Null => StackValueType::Null,
            Self::Int(_) => StackValueType::Int,
            Self::Cell(_) => StackValueType::Cell,
            Self::Slice(_) => StackValueType::Slice,
            Self::Tuple(_) => StackValueType::Tuple,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Self::Int(int) => Some(int),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Self::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&Cell> {
        match self {
            Self::Slice(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[StackValue]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl From<BigInt> for StackValue {
    #[inline]
    fn from(value: BigInt) -> Self {
        Self::Int(value)
    }
}

impl From<Cell> for StackValue {
    #[inline]
    fn from(value: Cell) -> Self {
        Self::Cell(value)
    }
}

impl From<Vec<StackValue>> for StackValue {
    #[inline]
    fn from(value: Vec<StackValue>) -> Self {
        Self::Tuple(value)
    }
}

/// Sequential typed reader over a result stack.
///
/// Items are read from the bottom of the stack (the first returned value)
/// to the top.
#[derive(Debug, Clone)]
pub struct StackReader {
    items: Vec<StackValue>,
    offset: usize,
}

impl StackReader {
    pub fn new(items: Vec<StackValue>) -> Self {
        Self { items, offset: 0 }
    }

    /// Number of items which were not read yet.
    pub fn remaining(&self) -> usize {
        self.items.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek(&self) -> Option<&StackValue> {
        self.items.get(self.offset)
    }

    pub fn read(&mut self) -> Result<StackValue, StackError> {
        let Some(item) = self.items.get_mut(self.offset) else {
            return Err(StackError::Underflow(self.offset));
        };
        self.offset += 1;
        Ok(std::mem::replace(item, StackValue::Null))
    }

    pub fn read_bigint(&mut self) -> Result<BigInt, StackError> {
        match ok!(self.read()) {
            StackValue::Int(int) => Ok(int),
            other => Err(invalid_type(StackValueType::Int, &other)),
        }
    }

    pub fn read_u64(&mut self) -> Result<u64, StackError> {
        let int = ok!(self.read_bigint());
        int.to_u64().ok_or(StackError::IntOverflow(64))
    }

    pub fn read_i64(&mut self) -> Result<i64, StackError> {
        let int = ok!(self.read_bigint());
        int.to_i64().ok_or(StackError::IntOverflow(64))
    }

    pub fn read_u128(&mut self) -> Result<u128, StackError> {
        let int = ok!(self.read_bigint());
        int.to_u128().ok_or(StackError::IntOverflow(128))
    }

    /// Reads an integer as a boolean (any non-zero value is `true`).
    pub fn read_bool(&mut self) -> Result<bool, StackError> {
        self.read_bigint().map(|int| !int.is_zero())
    }

    /// Reads either a cell or a slice.
    pub fn read_cell(&mut self) -> Result<Cell, StackError> {
        match ok!(self.read()) {
            StackValue::Cell(cell) | StackValue::Slice(cell) => Ok(cell),
            other => Err(invalid_type(StackValueType::Cell, &other)),
        }
    }

    pub fn read_cell_opt(&mut self) -> Result<Option<Cell>, StackError> {
        match ok!(self.read()) {
            StackValue::Null => Ok(None),
            StackValue::Cell(cell) | StackValue::Slice(cell) => Ok(Some(cell)),
            other => Err(invalid_type(StackValueType::Cell, &other)),
        }
    }

    pub fn read_tuple(&mut self) -> Result<StackReader, StackError> {
        match ok!(self.read()) {
            StackValue::Tuple(items) => Ok(StackReader::new(items)),
            other => Err(invalid_type(StackValueType::Tuple, &other)),
        }
    }
}

fn invalid_type(expected: StackValueType, actual: &StackValue) -> StackError {
    StackError::InvalidType {
        expected,
        actual: actual.ty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::make_cell;

    #[test]
    fn tuple_macro_builds_nested_values() {
        let cell = make_cell(123);
        let stack = tuple![
            int 1,
            int -1,
            null,
            cell cell.clone(),
            slice cell.clone(),
            [int 2, [null]],
        ];

        assert_eq!(stack.len(), 6);
        assert_eq!(stack[0], StackValue::int(1));
        assert_eq!(stack[1], StackValue::int(-1));
        assert!(stack[2].is_null());
        assert_eq!(stack[3].as_cell(), Some(&cell));
        assert_eq!(stack[4].as_slice(), Some(&cell));
        assert_eq!(
            stack[5],
            StackValue::Tuple(vec![
                StackValue::int(2),
                StackValue::Tuple(vec![StackValue::Null])
            ])
        );

        assert!(tuple![].is_empty());
    }

    #[test]
    fn reader_reads_typed_values() {
        let cell = make_cell(1);
        let mut reader = StackReader::new(tuple![
            int 1654662283,
            int 0,
            int -1,
            slice cell.clone(),
            null,
            [int 5],
        ]);

        assert_eq!(reader.remaining(), 6);
        assert_eq!(reader.read_u64().unwrap(), 1654662283);
        assert!(!reader.read_bool().unwrap());
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_cell().unwrap(), cell);
        assert_eq!(reader.read_cell_opt().unwrap(), None);

        let mut inner = reader.read_tuple().unwrap();
        assert_eq!(inner.read_i64().unwrap(), 5);
        assert!(inner.is_empty());

        assert!(reader.is_empty());
        assert!(matches!(reader.read(), Err(StackError::Underflow(6))));
    }

    #[test]
    fn reader_rejects_mismatched_types() {
        let mut reader = StackReader::new(tuple![null, int -5]);
        assert!(matches!(
            reader.read_bigint(),
            Err(StackError::InvalidType {
                expected: StackValueType::Int,
                actual: StackValueType::Null,
            })
        ));
        assert!(matches!(reader.read_u64(), Err(StackError::IntOverflow(64))));
    }
}
