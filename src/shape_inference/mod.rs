//! Validation and output inference for WebNN operators.
//!
//! Every `infer_*` function is pure: it takes the operator's input operands
//! plus its attributes and returns the output operand(s) or the first
//! constraint that was violated.

use crate::error::ValidationError;
use crate::operand::{DataType, Operand};

pub mod axes;
pub mod broadcast;
pub mod conv;
pub mod elementwise;
pub mod layout;
pub mod matmul;
pub mod normalization;
pub mod padding;
pub mod pool;
pub mod reduce;
pub mod resample;
pub mod shape;

pub use axes::{validate_axes, validate_axis};
pub use broadcast::broadcast_shapes;
pub use conv::{
    Conv2dAttributes, ConvTranspose2dAttributes, infer_conv_transpose2d, infer_conv2d,
};
pub use elementwise::{
    ElementwiseBinaryKind, infer_elementwise_binary, infer_prelu, infer_softmax, infer_where,
};
pub use layout::{
    Conv2dFilterLayout, ConvTranspose2dFilterLayout, InputOperandLayout, Padding2d,
    PaddingSizes, Size2d,
};
pub use matmul::{GemmAttributes, infer_gemm, infer_matmul};
pub use normalization::{
    BatchNormalizationAttributes, InstanceNormalizationAttributes, LayerNormalizationAttributes,
    infer_batch_normalization, infer_instance_normalization, infer_layer_normalization,
};
pub use padding::{
    AutoPad, Conv2dPadding, calculate_conv_transpose2d_padding, calculate_conv2d_padding,
    resolve_conv_transpose2d_padding, resolve_conv2d_padding,
};
pub use pool::{Pool2dAttributes, Pool2dKind, RoundingType, infer_global_pool2d, infer_pool2d};
pub use reduce::{
    ArgMinMaxAttributes, ArgMinMaxKind, ReduceAttributes, ReduceKind, infer_arg_min_max,
    infer_reduce,
};
pub use resample::{InterpolationMode, Resample2dAttributes, ResampleTarget, infer_resample2d};
pub use shape::{
    PadAttributes, PadMode, SplitSpec, infer_concat, infer_expand, infer_gather, infer_pad,
    infer_reshape, infer_slice, infer_split, infer_tile, infer_transpose,
};

pub(crate) fn check_rank(
    operand: &Operand,
    rank: usize,
    description: &str,
) -> Result<(), ValidationError> {
    if operand.rank() != rank {
        return Err(ValidationError::rank(format!(
            "{} must be {}-D, got shape {:?}",
            description, rank, operand.shape
        )));
    }
    Ok(())
}

pub(crate) fn check_floating_point(
    operand: &Operand,
    description: &str,
) -> Result<(), ValidationError> {
    if !operand.data_type.is_floating_point() {
        return Err(ValidationError::data_type(format!(
            "{} must be a floating point type, got {:?}",
            description, operand.data_type
        )));
    }
    Ok(())
}

pub(crate) fn check_same_data_type(
    operand: &Operand,
    expected: DataType,
    description: &str,
) -> Result<(), ValidationError> {
    if operand.data_type != expected {
        return Err(ValidationError::data_type(format!(
            "{} type {:?} doesn't match {:?}",
            description, operand.data_type, expected
        )));
    }
    Ok(())
}

pub(crate) fn check_positive_size2d(
    size: Size2d<u32>,
    description: &str,
) -> Result<(), ValidationError> {
    if size.height == 0 || size.width == 0 {
        return Err(ValidationError::attribute(format!(
            "{} must be > 0, got [{}, {}]",
            description, size.height, size.width
        )));
    }
    Ok(())
}
