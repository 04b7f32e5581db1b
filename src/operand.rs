use serde::{Deserialize, Serialize};

use crate::checked::{Checked, checked_product};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Float32,
    Float16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Int8,
    Uint8,
}

impl DataType {
    pub fn bytes_per_element(self) -> u64 {
        match self {
            DataType::Float32 => 4,
            DataType::Float16 => 2,
            DataType::Int32 => 4,
            DataType::Uint32 => 4,
            DataType::Int64 => 8,
            DataType::Uint64 => 8,
            DataType::Int8 => 1,
            DataType::Uint8 => 1,
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float16)
    }
}

/// Static type of a tensor: element type plus dimensions.
///
/// Operands produced by the `infer_*` functions always satisfy the size
/// invariant checked by [`Operand::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    pub data_type: DataType,
    #[serde(default)]
    pub shape: Vec<u32>,
}

impl Operand {
    /// Builds an operand whose element count and byte length fit in `u64`.
    pub fn new(data_type: DataType, shape: Vec<u32>) -> Result<Self, ValidationError> {
        let operand = Operand { data_type, shape };
        operand.byte_length().ok_or_else(|| {
            ValidationError::overflow(format!(
                "operand {:?} {:?} has a byte length that overflows",
                operand.data_type, operand.shape
            ))
        })?;
        Ok(operand)
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn element_count(&self) -> Option<u64> {
        checked_product(&self.shape).value()
    }

    pub fn byte_length(&self) -> Option<u64> {
        (Checked::new(self.element_count()?) * self.data_type.bytes_per_element()).value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_scalar_element_count() {
        let scalar = Operand::new(DataType::Float32, vec![]).unwrap();
        assert_eq!(scalar.rank(), 0);
        assert_eq!(scalar.element_count(), Some(1));
        assert_eq!(scalar.byte_length(), Some(4));
    }

    #[test]
    fn test_byte_length_uses_element_size() {
        let operand = Operand::new(DataType::Int64, vec![2, 3]).unwrap();
        assert_eq!(operand.element_count(), Some(6));
        assert_eq!(operand.byte_length(), Some(48));
    }

    #[test]
    fn test_byte_length_overflow_rejected() {
        // 2^32-1 cubed elements does not fit in 64 bits.
        let err = Operand::new(DataType::Uint8, vec![u32::MAX, u32::MAX, u32::MAX]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);

        // Element count fits but the byte length does not.
        let err = Operand::new(DataType::Float32, vec![u32::MAX, u32::MAX]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert!(Operand::new(DataType::Uint8, vec![u32::MAX, u32::MAX]).is_ok());
    }

    #[test]
    fn test_floating_point_types() {
        assert!(DataType::Float32.is_floating_point());
        assert!(DataType::Float16.is_floating_point());
        assert!(!DataType::Int32.is_floating_point());
        assert!(!DataType::Uint8.is_floating_point());
    }

    #[test]
    fn test_serde_round_trip() {
        let operand = Operand::new(DataType::Float16, vec![1, 3, 224, 224]).unwrap();
        let json = serde_json::to_string(&operand).unwrap();
        assert_eq!(json, r#"{"data_type":"float16","shape":[1,3,224,224]}"#);
        let decoded: Operand = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, operand);
    }
}
