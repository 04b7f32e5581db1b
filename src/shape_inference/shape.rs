//! Structural operators: concat, split, slice, pad, transpose, gather,
//! reshape, expand and tile.

use serde::{Deserialize, Serialize};

use crate::checked::{Checked, checked_product, checked_sum};
use crate::error::ValidationError;
use crate::operand::{DataType, Operand};
use crate::shape_inference::broadcast::broadcast_shapes;
use crate::shape_inference::{check_same_data_type, validate_axes, validate_axis};

fn check_attribute_length(
    operator: &str,
    attribute: &str,
    length: usize,
    input: &Operand,
) -> Result<(), ValidationError> {
    if length != input.rank() {
        return Err(ValidationError::attribute(format!(
            "{} {} length {} must match input rank {}, input shape: {:?}",
            operator,
            attribute,
            length,
            input.rank(),
            input.shape
        )));
    }
    Ok(())
}

/// Infer the output operand of concat
///
/// Concatenates multiple tensors along a specified axis.
pub fn infer_concat(inputs: &[Operand], axis: u32) -> Result<Operand, ValidationError> {
    let Some(first) = inputs.first() else {
        return Err(ValidationError::attribute(
            "Concat requires at least one input",
        ));
    };
    let rank = first.rank();
    validate_axis(axis, rank, "Concat")?;

    for (idx, input) in inputs.iter().enumerate().skip(1) {
        check_same_data_type(input, first.data_type, &format!("Concat input {}", idx))?;
        if input.rank() != rank {
            return Err(ValidationError::rank(format!(
                "Concat input {} has rank {} but expected rank {}",
                idx,
                input.rank(),
                rank
            )));
        }
        for (dim_idx, (&dim, &expected)) in input.shape.iter().zip(&first.shape).enumerate() {
            if dim_idx != axis as usize && dim != expected {
                return Err(ValidationError::shape(format!(
                    "Concat input {} dimension {} is {} but expected {} (all non-concat dimensions must match)",
                    idx, dim_idx, dim, expected
                )));
            }
        }
    }

    let axis_size = checked_sum(inputs.iter().map(|input| input.shape[axis as usize]))
        .ok_or_overflow(|| format!("Concat size along axis {} overflows", axis))?;
    let mut shape = first.shape.clone();
    shape[axis as usize] = axis_size;
    Operand::new(first.data_type, shape)
}

/// Represents the split specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSpec {
    /// Split into N equal parts
    Count(u32),
    /// Split into parts of specified sizes
    Sizes(Vec<u32>),
}

/// Infer the output operands of split
pub fn infer_split(
    input: &Operand,
    split: &SplitSpec,
    axis: u32,
) -> Result<Vec<Operand>, ValidationError> {
    validate_axis(axis, input.rank(), "Split")?;
    let axis_size = input.shape[axis as usize];

    let split_sizes = match split {
        SplitSpec::Count(count) => {
            if *count == 0 {
                return Err(ValidationError::attribute("Split count must be > 0"));
            }
            // An empty axis only splits into itself.
            if *count > axis_size.max(1) {
                return Err(ValidationError::attribute(format!(
                    "Split count {} exceeds axis size {}, input shape: {:?}",
                    count, axis_size, input.shape
                )));
            }
            if axis_size % count != 0 {
                return Err(ValidationError::shape(format!(
                    "Split count {} does not evenly divide axis size {}, input shape: {:?}",
                    count, axis_size, input.shape
                )));
            }
            vec![axis_size / count; *count as usize]
        }
        SplitSpec::Sizes(sizes) => {
            if sizes.is_empty() || sizes.contains(&0) {
                return Err(ValidationError::attribute(format!(
                    "Split sizes {:?} must be non-empty and each > 0",
                    sizes
                )));
            }
            let total = checked_sum(sizes.iter().copied())
                .ok_or_overflow(|| format!("Split sizes {:?} sum overflows", sizes))?;
            if total != axis_size {
                return Err(ValidationError::shape(format!(
                    "Split sizes {:?} sum to {} but axis size is {}, input shape: {:?}",
                    sizes, total, axis_size, input.shape
                )));
            }
            sizes.clone()
        }
    };

    split_sizes
        .into_iter()
        .map(|size| {
            let mut shape = input.shape.clone();
            shape[axis as usize] = size;
            Operand::new(input.data_type, shape)
        })
        .collect()
}

/// Infer the output operand of slice
///
/// Axes with size 0 yield an empty dimension and skip the bounds check.
pub fn infer_slice(
    input: &Operand,
    starts: &[u32],
    sizes: &[u32],
) -> Result<Operand, ValidationError> {
    check_attribute_length("Slice", "starts", starts.len(), input)?;
    check_attribute_length("Slice", "sizes", sizes.len(), input)?;

    for (dim_idx, ((&start, &size), &dim)) in
        starts.iter().zip(sizes).zip(&input.shape).enumerate()
    {
        if size == 0 {
            continue;
        }
        if start >= dim {
            return Err(ValidationError::bounds(format!(
                "Slice start {} for dimension {} exceeds input dimension size {}",
                start, dim_idx, dim
            )));
        }
        let end = (Checked::new(start) + size).ok_or_overflow(|| {
            format!(
                "Slice end (start {} + size {}) for dimension {} overflows",
                start, size, dim_idx
            )
        })?;
        if end > dim {
            return Err(ValidationError::bounds(format!(
                "Slice end {} (start {} + size {}) for dimension {} exceeds input dimension size {}",
                end, start, size, dim_idx, dim
            )));
        }
    }

    Operand::new(input.data_type, sizes.to_vec())
}

/// Pad mode for pad operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadMode {
    Constant,
    Edge,
    Reflection,
    Symmetric,
}

/// Attributes of pad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadAttributes {
    pub beginning_padding: Vec<u32>,
    pub ending_padding: Vec<u32>,
    pub mode: PadMode,
}

/// Infer the output operand of pad
pub fn infer_pad(input: &Operand, attributes: &PadAttributes) -> Result<Operand, ValidationError> {
    check_attribute_length(
        "Pad",
        "beginning padding",
        attributes.beginning_padding.len(),
        input,
    )?;
    check_attribute_length("Pad", "ending padding", attributes.ending_padding.len(), input)?;

    let mut shape = Vec::with_capacity(input.rank());
    for (i, ((&dim, &begin), &end)) in input
        .shape
        .iter()
        .zip(&attributes.beginning_padding)
        .zip(&attributes.ending_padding)
        .enumerate()
    {
        // Reflection mirrors without the edge element, symmetric with it.
        let limit_ok = match attributes.mode {
            PadMode::Constant | PadMode::Edge => true,
            PadMode::Reflection => (begin == 0 || begin < dim) && (end == 0 || end < dim),
            PadMode::Symmetric => begin <= dim && end <= dim,
        };
        if !limit_ok {
            return Err(ValidationError::attribute(format!(
                "Pad {:?} padding [{}, {}] for dimension {} is too large for size {}",
                attributes.mode, begin, end, i, dim
            )));
        }
        let padded = (Checked::new(dim) + begin + end).ok_or_overflow(|| {
            format!(
                "Pad dimension {} size {} + {} + {} overflows",
                i, dim, begin, end
            )
        })?;
        shape.push(padded);
    }

    Operand::new(input.data_type, shape)
}

/// Infer the output operand of transpose
pub fn infer_transpose(input: &Operand, permutation: &[u32]) -> Result<Operand, ValidationError> {
    check_attribute_length("Transpose", "permutation", permutation.len(), input)?;
    validate_axes(permutation, input.rank(), "Transpose")?;

    let shape = permutation
        .iter()
        .map(|&axis| input.shape[axis as usize])
        .collect();
    Operand::new(input.data_type, shape)
}

/// Infer the output operand of gather
///
/// Output shape = input[..axis] + indices + input[axis + 1..]
pub fn infer_gather(
    input: &Operand,
    indices: &Operand,
    axis: u32,
) -> Result<Operand, ValidationError> {
    if !matches!(
        indices.data_type,
        DataType::Int32 | DataType::Uint32 | DataType::Int64
    ) {
        return Err(ValidationError::data_type(format!(
            "Gather indices must be int32, uint32 or int64, got {:?}",
            indices.data_type
        )));
    }
    validate_axis(axis, input.rank(), "Gather")?;

    let axis = axis as usize;
    let mut shape = Vec::with_capacity(input.rank() - 1 + indices.rank());
    shape.extend_from_slice(&input.shape[..axis]);
    shape.extend_from_slice(&indices.shape);
    shape.extend_from_slice(&input.shape[axis + 1..]);
    Operand::new(input.data_type, shape)
}

/// Infer the output operand of reshape
pub fn infer_reshape(input: &Operand, new_shape: &[u32]) -> Result<Operand, ValidationError> {
    let input_count = checked_product(&input.shape)
        .ok_or_overflow(|| format!("Reshape input shape {:?} element count overflows", input.shape))?;
    let output_count = checked_product(new_shape)
        .ok_or_overflow(|| format!("Reshape new shape {:?} element count overflows", new_shape))?;

    if input_count != output_count {
        return Err(ValidationError::shape(format!(
            "Reshape element count mismatch: input shape {:?} has {} elements, new shape {:?} has {}",
            input.shape, input_count, new_shape, output_count
        )));
    }

    Operand::new(input.data_type, new_shape.to_vec())
}

/// Infer the output operand of expand
///
/// Broadcasts a tensor to a larger shape. Dimensions of size 1 can be expanded to larger sizes.
pub fn infer_expand(input: &Operand, new_shape: &[u32]) -> Result<Operand, ValidationError> {
    let shape = broadcast_shapes(&input.shape, new_shape, false).map_err(|err| {
        ValidationError::shape(format!(
            "Expand input shape {:?} cannot expand to {:?}: {}",
            input.shape,
            new_shape,
            err.reason()
        ))
    })?;
    Operand::new(input.data_type, shape)
}

/// Infer the output operand of tile
pub fn infer_tile(input: &Operand, repetitions: &[u32]) -> Result<Operand, ValidationError> {
    check_attribute_length("Tile", "repetitions", repetitions.len(), input)?;
    if repetitions.contains(&0) {
        return Err(ValidationError::attribute(format!(
            "Tile repetitions {:?} must each be > 0",
            repetitions
        )));
    }

    let shape = input
        .shape
        .iter()
        .zip(repetitions)
        .map(|(&dim, &rep)| {
            (Checked::new(dim) * rep)
                .ok_or_overflow(|| format!("Tile dimension {} x {} overflows", dim, rep))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Operand::new(input.data_type, shape)
}
