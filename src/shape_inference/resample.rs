use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ValidationError;
use crate::operand::Operand;
use crate::shape_inference::layout::Size2d;
use crate::shape_inference::{check_floating_point, check_positive_size2d, check_rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    NearestNeighbor,
    Linear,
}

/// How the two resampled axes get their new sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleTarget {
    Scales(Size2d<f32>),
    Sizes(Size2d<u32>),
}

/// Attributes of resample2d
#[derive(Debug, Clone, PartialEq)]
pub struct Resample2dAttributes {
    pub mode: InterpolationMode,
    pub target: ResampleTarget,
    /// Two consecutive axes: [0, 1], [1, 2] or [2, 3].
    pub axes: [u32; 2],
}

const ALLOWED_AXES: [[u32; 2]; 3] = [[0, 1], [1, 2], [2, 3]];

fn scaled_size(axis: u32, size: u32, scale: f32) -> Result<u32, ValidationError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ValidationError::attribute(format!(
            "Resample2d scale {} for axis {} must be finite and > 0",
            scale, axis
        )));
    }
    let output = (f64::from(size) * f64::from(scale)).floor();
    trace!(axis, size, scale, output, "resample2d scaled size");
    if output < 1.0 {
        let reason = format!(
            "Resample2d axis {} of size {} scaled by {} is empty",
            axis, size, scale
        );
        debug!(operator = "Resample2d", %reason, "rejected scales");
        return Err(ValidationError::attribute(reason));
    }
    if output > f64::from(u32::MAX) {
        return Err(ValidationError::overflow(format!(
            "Resample2d axis {} of size {} scaled by {} exceeds u32::MAX",
            axis, size, scale
        )));
    }
    Ok(output as u32)
}

/// Infer the output operand of resample2d
///
/// Only the two selected axes change size.
pub fn infer_resample2d(
    input: &Operand,
    attributes: &Resample2dAttributes,
) -> Result<Operand, ValidationError> {
    check_rank(input, 4, "Resample2d input")?;
    check_floating_point(input, "Resample2d input")?;
    if !ALLOWED_AXES.contains(&attributes.axes) {
        return Err(ValidationError::attribute(format!(
            "Resample2d axes {:?} must be one of {:?}",
            attributes.axes, ALLOWED_AXES
        )));
    }

    let [axis0, axis1] = attributes.axes;
    let (size0, size1) = match attributes.target {
        ResampleTarget::Sizes(sizes) => {
            check_positive_size2d(sizes, "Resample2d sizes")?;
            (sizes.height, sizes.width)
        }
        ResampleTarget::Scales(scales) => (
            scaled_size(axis0, input.shape[axis0 as usize], scales.height)?,
            scaled_size(axis1, input.shape[axis1 as usize], scales.width)?,
        ),
    };

    let mut shape = input.shape.clone();
    shape[axis0 as usize] = size0;
    shape[axis1 as usize] = size1;
    Operand::new(input.data_type, shape)
}
