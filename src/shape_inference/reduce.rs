use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::operand::{DataType, Operand};
use crate::shape_inference::{check_floating_point, validate_axes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReduceKind {
    L1,
    L2,
    LogSum,
    LogSumExp,
    Max,
    Mean,
    Min,
    Product,
    Sum,
    SumSquare,
}

impl ReduceKind {
    fn name(self) -> &'static str {
        match self {
            ReduceKind::L1 => "ReduceL1",
            ReduceKind::L2 => "ReduceL2",
            ReduceKind::LogSum => "ReduceLogSum",
            ReduceKind::LogSumExp => "ReduceLogSumExp",
            ReduceKind::Max => "ReduceMax",
            ReduceKind::Mean => "ReduceMean",
            ReduceKind::Min => "ReduceMin",
            ReduceKind::Product => "ReduceProduct",
            ReduceKind::Sum => "ReduceSum",
            ReduceKind::SumSquare => "ReduceSumSquare",
        }
    }

    fn requires_floating_point(self) -> bool {
        matches!(
            self,
            ReduceKind::L2 | ReduceKind::LogSum | ReduceKind::LogSumExp | ReduceKind::Mean
        )
    }
}

/// Attributes of the reduce family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceAttributes {
    pub kind: ReduceKind,
    /// An empty list reduces nothing.
    pub axes: Vec<u32>,
    pub keep_dimensions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgMinMaxKind {
    ArgMin,
    ArgMax,
}

impl ArgMinMaxKind {
    fn name(self) -> &'static str {
        match self {
            ArgMinMaxKind::ArgMin => "ArgMin",
            ArgMinMaxKind::ArgMax => "ArgMax",
        }
    }
}

/// Attributes of argMin / argMax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgMinMaxAttributes {
    pub kind: ArgMinMaxKind,
    pub axes: Vec<u32>,
    pub keep_dimensions: bool,
}

/// Reduced axes become 1 when `keep_dimensions` is set, otherwise they are removed.
fn reduce_shape(shape: &[u32], axes: &[u32], keep_dimensions: bool) -> Vec<u32> {
    shape
        .iter()
        .enumerate()
        .filter_map(|(i, &dim)| {
            if !axes.contains(&(i as u32)) {
                Some(dim)
            } else if keep_dimensions {
                Some(1)
            } else {
                None
            }
        })
        .collect()
}

/// Infer the output operand of a reduction (reduceSum, reduceMean, ...)
pub fn infer_reduce(
    input: &Operand,
    attributes: &ReduceAttributes,
) -> Result<Operand, ValidationError> {
    let name = attributes.kind.name();
    if attributes.kind.requires_floating_point() {
        check_floating_point(input, &format!("{} input", name))?;
    }
    validate_axes(&attributes.axes, input.rank(), name)?;

    Operand::new(
        input.data_type,
        reduce_shape(&input.shape, &attributes.axes, attributes.keep_dimensions),
    )
}

/// Infer the output operand of argMin / argMax
///
/// Output indices are always int64.
pub fn infer_arg_min_max(
    input: &Operand,
    attributes: &ArgMinMaxAttributes,
) -> Result<Operand, ValidationError> {
    validate_axes(&attributes.axes, input.rank(), attributes.kind.name())?;

    Operand::new(
        DataType::Int64,
        reduce_shape(&input.shape, &attributes.axes, attributes.keep_dimensions),
    )
}
