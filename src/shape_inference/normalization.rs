//! Batch, instance and layer normalization.
//!
//! Normalization never changes the input's shape or type; validation is about
//! the per-feature helper operands (mean, variance, scale, bias).

use crate::error::ValidationError;
use crate::operand::Operand;
use crate::shape_inference::layout::InputOperandLayout;
use crate::shape_inference::{
    check_floating_point, check_rank, check_same_data_type, validate_axes, validate_axis,
};

/// Attributes of batchNormalization
#[derive(Debug, Clone, PartialEq)]
pub struct BatchNormalizationAttributes {
    pub scale: Option<Operand>,
    pub bias: Option<Operand>,
    /// Feature axis of the input.
    pub axis: u32,
}

/// Attributes of instanceNormalization
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceNormalizationAttributes {
    pub scale: Option<Operand>,
    pub bias: Option<Operand>,
    /// Selects the channel axis used as the feature axis.
    pub layout: InputOperandLayout,
}

/// Attributes of layerNormalization
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNormalizationAttributes {
    pub scale: Option<Operand>,
    pub bias: Option<Operand>,
    pub axes: Vec<u32>,
}

/// Checks a 1-D per-feature operand against the feature size.
fn check_feature_operand(
    operand: &Operand,
    input: &Operand,
    feature_size: u32,
    description: &str,
) -> Result<(), ValidationError> {
    check_same_data_type(operand, input.data_type, description)?;
    check_rank(operand, 1, description)?;
    if operand.shape[0] != feature_size {
        return Err(ValidationError::shape(format!(
            "{} length {} must equal the input's feature size {}",
            description, operand.shape[0], feature_size
        )));
    }
    Ok(())
}

/// Infer the output operand of batchNormalization
pub fn infer_batch_normalization(
    input: &Operand,
    mean: &Operand,
    variance: &Operand,
    attributes: &BatchNormalizationAttributes,
) -> Result<Operand, ValidationError> {
    check_floating_point(input, "BatchNormalization input")?;
    validate_axis(attributes.axis, input.rank(), "BatchNormalization")?;
    let feature_size = input.shape[attributes.axis as usize];

    check_feature_operand(mean, input, feature_size, "BatchNormalization mean")?;
    check_feature_operand(variance, input, feature_size, "BatchNormalization variance")?;
    if let Some(scale) = &attributes.scale {
        check_feature_operand(scale, input, feature_size, "BatchNormalization scale")?;
    }
    if let Some(bias) = &attributes.bias {
        check_feature_operand(bias, input, feature_size, "BatchNormalization bias")?;
    }

    Ok(input.clone())
}

/// Infer the output operand of instanceNormalization
pub fn infer_instance_normalization(
    input: &Operand,
    attributes: &InstanceNormalizationAttributes,
) -> Result<Operand, ValidationError> {
    check_rank(input, 4, "InstanceNormalization input")?;
    check_floating_point(input, "InstanceNormalization input")?;
    let feature_size = input.shape[attributes.layout.channel_axis()];

    if let Some(scale) = &attributes.scale {
        check_feature_operand(scale, input, feature_size, "InstanceNormalization scale")?;
    }
    if let Some(bias) = &attributes.bias {
        check_feature_operand(bias, input, feature_size, "InstanceNormalization bias")?;
    }

    Ok(input.clone())
}

/// Infer the output operand of layerNormalization
///
/// Scale and bias must have exactly the input's sizes along `axes`, in the
/// order the axes are listed.
pub fn infer_layer_normalization(
    input: &Operand,
    attributes: &LayerNormalizationAttributes,
) -> Result<Operand, ValidationError> {
    check_floating_point(input, "LayerNormalization input")?;
    validate_axes(&attributes.axes, input.rank(), "LayerNormalization")?;

    let normalized_shape: Vec<u32> = attributes
        .axes
        .iter()
        .map(|&axis| input.shape[axis as usize])
        .collect();

    for (operand, description) in [
        (&attributes.scale, "LayerNormalization scale"),
        (&attributes.bias, "LayerNormalization bias"),
    ] {
        let Some(operand) = operand else {
            continue;
        };
        check_same_data_type(operand, input.data_type, description)?;
        if operand.shape != normalized_shape {
            return Err(ValidationError::shape(format!(
                "{} shape {:?} must equal the input's sizes {:?} along axes {:?}",
                description, operand.shape, normalized_shape, attributes.axes
            )));
        }
    }

    Ok(input.clone())
}
