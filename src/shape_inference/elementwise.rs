use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::operand::{DataType, Operand};
use crate::shape_inference::broadcast::broadcast_shapes;
use crate::shape_inference::{check_floating_point, check_rank, check_same_data_type};

/// Binary elementwise operators, including comparisons and logical ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementwiseBinaryKind {
    Add,
    Sub,
    Mul,
    Div,
    Max,
    Min,
    Pow,
    Equal,
    Greater,
    GreaterOrEqual,
    Lesser,
    LesserOrEqual,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
}

impl ElementwiseBinaryKind {
    fn is_comparison(self) -> bool {
        matches!(
            self,
            ElementwiseBinaryKind::Equal
                | ElementwiseBinaryKind::Greater
                | ElementwiseBinaryKind::GreaterOrEqual
                | ElementwiseBinaryKind::Lesser
                | ElementwiseBinaryKind::LesserOrEqual
        )
    }

    fn is_logical(self) -> bool {
        matches!(
            self,
            ElementwiseBinaryKind::LogicalAnd
                | ElementwiseBinaryKind::LogicalOr
                | ElementwiseBinaryKind::LogicalXor
        )
    }
}

/// Infer the output operand of a binary elementwise operation.
///
/// Comparison and logical operators produce uint8; logical operators also
/// require uint8 inputs.
pub fn infer_elementwise_binary(
    a: &Operand,
    b: &Operand,
    kind: ElementwiseBinaryKind,
) -> Result<Operand, ValidationError> {
    check_same_data_type(b, a.data_type, &format!("{:?} second input", kind))?;
    if kind.is_logical() {
        check_same_data_type(a, DataType::Uint8, &format!("{:?} input", kind))?;
    }

    let shape = broadcast_shapes(&a.shape, &b.shape, true)?;
    let data_type = if kind.is_comparison() || kind.is_logical() {
        DataType::Uint8
    } else {
        a.data_type
    };
    Operand::new(data_type, shape)
}

/// Infer the output operand of where
///
/// The value operands are broadcast together, then the condition is
/// broadcast onto that result.
pub fn infer_where(
    condition: &Operand,
    true_value: &Operand,
    false_value: &Operand,
) -> Result<Operand, ValidationError> {
    check_same_data_type(condition, DataType::Uint8, "Where condition")?;
    check_same_data_type(false_value, true_value.data_type, "Where false value")?;

    let value_shape = broadcast_shapes(&true_value.shape, &false_value.shape, true)?;
    let shape = broadcast_shapes(&condition.shape, &value_shape, true)?;
    Operand::new(true_value.data_type, shape)
}

/// Infer the output operand of prelu
///
/// Slope must be unidirectionally broadcastable to input; output equals input.
pub fn infer_prelu(input: &Operand, slope: &Operand) -> Result<Operand, ValidationError> {
    check_floating_point(input, "PReLU input")?;
    check_same_data_type(slope, input.data_type, "PReLU slope")?;
    broadcast_shapes(&slope.shape, &input.shape, false).map_err(|err| {
        ValidationError::shape(format!(
            "PReLU slope is not broadcastable to input: {}",
            err.reason()
        ))
    })?;
    Ok(input.clone())
}

pub fn infer_softmax(input: &Operand) -> Result<Operand, ValidationError> {
    check_rank(input, 2, "Softmax input")?;
    check_floating_point(input, "Softmax input")?;
    Ok(input.clone())
}
