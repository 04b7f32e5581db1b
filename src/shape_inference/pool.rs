use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ValidationError;
use crate::operand::Operand;
use crate::shape_inference::conv::calculate_window_output_size;
use crate::shape_inference::layout::{InputOperandLayout, Size2d};
use crate::shape_inference::padding::{Conv2dPadding, resolve_conv2d_padding};
use crate::shape_inference::{check_floating_point, check_positive_size2d, check_rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool2dKind {
    Average,
    L2,
    Max,
}

impl Pool2dKind {
    fn name(self) -> &'static str {
        match self {
            Pool2dKind::Average => "AveragePool2d",
            Pool2dKind::L2 => "L2Pool2d",
            Pool2dKind::Max => "MaxPool2d",
        }
    }

    fn requires_floating_point(self) -> bool {
        matches!(self, Pool2dKind::Average | Pool2dKind::L2)
    }
}

/// Rounding applied to fractional output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingType {
    Floor,
    Ceil,
}

/// Attributes of pool2d
#[derive(Debug, Clone, PartialEq)]
pub struct Pool2dAttributes {
    pub kind: Pool2dKind,
    pub window_dimensions: Size2d<u32>,
    pub padding: Conv2dPadding,
    pub strides: Size2d<u32>,
    pub dilations: Size2d<u32>,
    pub layout: InputOperandLayout,
    pub rounding_type: RoundingType,
    /// When present, must match the floor or the ceil candidate.
    pub output_sizes: Option<Size2d<u32>>,
}

fn check_input(input: &Operand, kind: Pool2dKind) -> Result<(), ValidationError> {
    let name = kind.name();
    check_rank(input, 4, &format!("{} input", name))?;
    if kind.requires_floating_point() {
        check_floating_point(input, &format!("{} input", name))?;
    }
    Ok(())
}

/// Infer the output operand of a 2-D pooling operation (average, L2, max).
///
/// Following the W3C WebNN specification for pool2d:
/// https://www.w3.org/TR/webnn/#api-mlgraphbuilder-pool2d
pub fn infer_pool2d(
    input: &Operand,
    attributes: &Pool2dAttributes,
) -> Result<Operand, ValidationError> {
    let name = attributes.kind.name();
    check_input(input, attributes.kind)?;
    check_positive_size2d(
        attributes.window_dimensions,
        &format!("{} window dimensions", name),
    )?;
    check_positive_size2d(attributes.strides, &format!("{} strides", name))?;
    check_positive_size2d(attributes.dilations, &format!("{} dilations", name))?;

    let input_info = attributes.layout.decompose(&input.shape);
    let input_size = Size2d::new(input_info.height, input_info.width);
    let padding = resolve_conv2d_padding(
        &attributes.padding,
        input_size,
        attributes.window_dimensions,
        attributes.strides,
        attributes.dilations,
    )?;

    let float_height = calculate_window_output_size(
        name,
        input_size.height,
        attributes.window_dimensions.height,
        padding.height(),
        attributes.strides.height,
        attributes.dilations.height,
    )?;
    let float_width = calculate_window_output_size(
        name,
        input_size.width,
        attributes.window_dimensions.width,
        padding.width(),
        attributes.strides.width,
        attributes.dilations.width,
    )?;
    trace!(float_height, float_width, ?padding, "{} output sizes", name);

    // Both candidates are exact: the float sizes are bounded by u32::MAX.
    let floor = Size2d::new(float_height.floor() as u32, float_width.floor() as u32);
    let ceil = Size2d::new(float_height.ceil() as u32, float_width.ceil() as u32);

    let output = match attributes.output_sizes {
        Some(requested) => {
            if requested != floor && requested != ceil {
                let reason = if floor == ceil {
                    format!(
                        "{} output sizes [{}, {}] must be [{}, {}]",
                        name, requested.height, requested.width, floor.height, floor.width
                    )
                } else {
                    format!(
                        "{} output sizes [{}, {}] must be either [{}, {}] or [{}, {}]",
                        name,
                        requested.height,
                        requested.width,
                        floor.height,
                        floor.width,
                        ceil.height,
                        ceil.width
                    )
                };
                debug!(operator = name, %reason, "rejected explicit output sizes");
                return Err(ValidationError::attribute(reason));
            }
            requested
        }
        None => match attributes.rounding_type {
            RoundingType::Floor => floor,
            RoundingType::Ceil => ceil,
        },
    };

    Operand::new(
        input.data_type,
        attributes.layout.compose(
            input_info.batches,
            input_info.channels,
            output.height,
            output.width,
        ),
    )
}

/// Infer the output operand of a global pooling operation.
/// Global pooling reduces spatial dimensions to 1x1
pub fn infer_global_pool2d(
    input: &Operand,
    kind: Pool2dKind,
    layout: InputOperandLayout,
) -> Result<Operand, ValidationError> {
    check_input(input, kind)?;
    let info = layout.decompose(&input.shape);
    Operand::new(input.data_type, layout.compose(info.batches, info.channels, 1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::operand::DataType;
    use crate::shape_inference::layout::Padding2d;
    use crate::shape_inference::padding::AutoPad;

    fn float32(shape: &[u32]) -> Operand {
        Operand::new(DataType::Float32, shape.to_vec()).unwrap()
    }

    fn no_padding() -> Conv2dPadding {
        Conv2dPadding::Explicit(Padding2d::new(Size2d::new(0, 0), Size2d::new(0, 0)))
    }

    fn attributes(kind: Pool2dKind, window: u32, stride: u32) -> Pool2dAttributes {
        Pool2dAttributes {
            kind,
            window_dimensions: Size2d::new(window, window),
            padding: no_padding(),
            strides: Size2d::new(stride, stride),
            dilations: Size2d::new(1, 1),
            layout: InputOperandLayout::Nchw,
            rounding_type: RoundingType::Floor,
            output_sizes: None,
        }
    }

    #[test]
    fn test_pool2d_basic() {
        let output = infer_pool2d(
            &float32(&[1, 3, 32, 32]),
            &attributes(Pool2dKind::Max, 2, 2),
        )
        .unwrap();
        assert_eq!(output.shape, vec![1, 3, 16, 16]);
    }

    #[test]
    fn test_pool2d_nhwc() {
        let mut attrs = attributes(Pool2dKind::Average, 3, 1);
        attrs.layout = InputOperandLayout::Nhwc;
        let output = infer_pool2d(&float32(&[2, 10, 12, 5]), &attrs).unwrap();
        assert_eq!(output.shape, vec![2, 8, 10, 5]);
    }

    #[test]
    fn test_pool2d_rounding() {
        // (7 - 2) / 2 + 1 = 3.5
        let mut attrs = attributes(Pool2dKind::Max, 2, 2);
        let input = float32(&[1, 1, 7, 7]);
        assert_eq!(infer_pool2d(&input, &attrs).unwrap().shape, vec![1, 1, 3, 3]);
        attrs.rounding_type = RoundingType::Ceil;
        assert_eq!(infer_pool2d(&input, &attrs).unwrap().shape, vec![1, 1, 4, 4]);
    }

    #[test]
    fn test_pool2d_explicit_output_sizes() {
        let input = float32(&[1, 1, 7, 7]);
        let mut attrs = attributes(Pool2dKind::Max, 2, 2);
        attrs.output_sizes = Some(Size2d::new(4, 4));
        assert_eq!(infer_pool2d(&input, &attrs).unwrap().shape, vec![1, 1, 4, 4]);

        attrs.output_sizes = Some(Size2d::new(3, 3));
        assert_eq!(infer_pool2d(&input, &attrs).unwrap().shape, vec![1, 1, 3, 3]);

        attrs.output_sizes = Some(Size2d::new(5, 5));
        let err = infer_pool2d(&input, &attrs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttribute);
        assert!(err.reason().contains("either [3, 3] or [4, 4]"));
    }

    #[test]
    fn test_pool2d_explicit_output_sizes_single_candidate() {
        // (8 - 2) / 2 + 1 = 4 exactly, so floor and ceil coincide
        let input = float32(&[1, 1, 8, 8]);
        let mut attrs = attributes(Pool2dKind::Max, 2, 2);
        attrs.output_sizes = Some(Size2d::new(5, 4));
        let err = infer_pool2d(&input, &attrs).unwrap_err();
        assert!(err.reason().ends_with("must be [4, 4]"));
        assert!(!err.reason().contains("either"));
    }

    #[test]
    fn test_pool2d_mixed_rounding_rejected() {
        // Height floors to 3, width to 3; ceil is [4, 4]. [3, 4] mixes both.
        let input = float32(&[1, 1, 7, 7]);
        let mut attrs = attributes(Pool2dKind::Max, 2, 2);
        attrs.output_sizes = Some(Size2d::new(3, 4));
        assert!(infer_pool2d(&input, &attrs).is_err());
    }

    #[test]
    fn test_pool2d_same_lower() {
        let mut attrs = attributes(Pool2dKind::Average, 3, 2);
        attrs.padding = Conv2dPadding::Auto(AutoPad::SameLower);
        let output = infer_pool2d(&float32(&[1, 4, 9, 10]), &attrs).unwrap();
        assert_eq!(output.shape, vec![1, 4, 5, 5]);
    }

    #[test]
    fn test_pool2d_invalid_attributes() {
        let input = float32(&[1, 1, 8, 8]);
        let err = infer_pool2d(&input, &attributes(Pool2dKind::Max, 0, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttribute);
        let err = infer_pool2d(&input, &attributes(Pool2dKind::Max, 2, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttribute);
        let err = infer_pool2d(&float32(&[1, 8, 8]), &attributes(Pool2dKind::Max, 2, 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RankMismatch);
    }

    #[test]
    fn test_pool2d_window_too_large() {
        let err = infer_pool2d(&float32(&[1, 1, 4, 4]), &attributes(Pool2dKind::Max, 5, 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
    }

    #[test]
    fn test_pool2d_integer_types() {
        let input = Operand::new(DataType::Int8, vec![1, 1, 4, 4]).unwrap();
        assert!(infer_pool2d(&input, &attributes(Pool2dKind::Max, 2, 2)).is_ok());
        let err = infer_pool2d(&input, &attributes(Pool2dKind::Average, 2, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = infer_pool2d(&input, &attributes(Pool2dKind::L2, 2, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_global_pool() {
        let nchw = infer_global_pool2d(
            &float32(&[2, 16, 7, 7]),
            Pool2dKind::Average,
            InputOperandLayout::Nchw,
        )
        .unwrap();
        assert_eq!(nchw.shape, vec![2, 16, 1, 1]);

        let nhwc = infer_global_pool2d(
            &float32(&[2, 7, 7, 16]),
            Pool2dKind::Max,
            InputOperandLayout::Nhwc,
        )
        .unwrap();
        assert_eq!(nhwc.shape, vec![2, 1, 1, 16]);

        assert!(
            infer_global_pool2d(&float32(&[7, 7]), Pool2dKind::Max, InputOperandLayout::Nchw)
                .is_err()
        );
    }
}
