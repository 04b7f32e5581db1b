//! Padding resolution for convolution-family operators.
//!
//! `SameUpper` puts the extra cell of an odd total padding at the end,
//! `SameLower` puts it at the beginning.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::checked::Checked;
use crate::error::ValidationError;
use crate::shape_inference::layout::{Padding2d, PaddingSizes, Size2d};

/// Automatic padding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPad {
    SameUpper,
    SameLower,
}

/// Padding selection for 2-D window operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conv2dPadding {
    /// Caller-supplied padding, used unchanged.
    Explicit(Padding2d),
    /// Padding derived from the input, window, stride and dilation.
    Auto(AutoPad),
}

/// `(filter_size - 1) * dilation + 1`
pub(crate) fn effective_kernel_size(filter_size: u32, dilation: u32) -> Checked<u32> {
    (Checked::new(filter_size) - 1) * dilation + 1
}

fn split_total_padding(auto_pad: AutoPad, total: u32) -> PaddingSizes {
    let half_down = total / 2;
    let half_up = total - half_down;
    match auto_pad {
        AutoPad::SameUpper => PaddingSizes {
            beginning: half_down,
            ending: half_up,
        },
        AutoPad::SameLower => PaddingSizes {
            beginning: half_up,
            ending: half_down,
        },
    }
}

/// Padding that keeps `ceil(input_size / stride)` output positions.
pub fn calculate_conv2d_padding(
    auto_pad: AutoPad,
    input_size: u32,
    filter_size: u32,
    stride: u32,
    dilation: u32,
) -> Result<PaddingSizes, ValidationError> {
    let output_size = Checked::new(input_size).div_ceil(stride);
    let needed_input_size =
        (output_size - 1) * stride + effective_kernel_size(filter_size, dilation);
    let needed_input_size = needed_input_size.ok_or_overflow(|| {
        format!(
            "Padding for input size {} with filter size {}, stride {} and dilation {} overflows",
            input_size, filter_size, stride, dilation
        )
    })?;
    let total_padding = needed_input_size.saturating_sub(input_size);
    let padding = split_total_padding(auto_pad, total_padding);
    trace!(?auto_pad, input_size, total_padding, ?padding, "resolved conv2d padding");
    Ok(padding)
}

/// Padding for the transposed direction:
/// `stride * (input_size - 1) + effective_kernel + output_padding - input_size * stride`.
pub fn calculate_conv_transpose2d_padding(
    auto_pad: AutoPad,
    input_size: u32,
    filter_size: u32,
    stride: u32,
    dilation: u32,
    output_padding: u32,
) -> Result<PaddingSizes, ValidationError> {
    let total_padding = Checked::new(stride) * (Checked::new(input_size) - 1)
        + effective_kernel_size(filter_size, dilation)
        + output_padding
        - Checked::new(input_size) * stride;
    let total_padding = total_padding.ok_or_overflow(|| {
        format!(
            "Transposed padding for input size {} with filter size {}, stride {}, dilation {} and output padding {} overflows",
            input_size, filter_size, stride, dilation, output_padding
        )
    })?;
    let padding = split_total_padding(auto_pad, total_padding);
    trace!(
        ?auto_pad,
        input_size,
        total_padding,
        ?padding,
        "resolved convTranspose2d padding"
    );
    Ok(padding)
}

/// Returns explicit padding unchanged, or computes it for both spatial axes.
pub fn resolve_conv2d_padding(
    padding: &Conv2dPadding,
    input: Size2d<u32>,
    filter: Size2d<u32>,
    strides: Size2d<u32>,
    dilations: Size2d<u32>,
) -> Result<Padding2d, ValidationError> {
    match padding {
        Conv2dPadding::Explicit(explicit) => Ok(*explicit),
        Conv2dPadding::Auto(auto_pad) => Ok(Padding2d::from_axes(
            calculate_conv2d_padding(
                *auto_pad,
                input.height,
                filter.height,
                strides.height,
                dilations.height,
            )?,
            calculate_conv2d_padding(
                *auto_pad,
                input.width,
                filter.width,
                strides.width,
                dilations.width,
            )?,
        )),
    }
}

/// Transposed counterpart of [`resolve_conv2d_padding`].
pub fn resolve_conv_transpose2d_padding(
    padding: &Conv2dPadding,
    input: Size2d<u32>,
    filter: Size2d<u32>,
    strides: Size2d<u32>,
    dilations: Size2d<u32>,
    output_padding: Size2d<u32>,
) -> Result<Padding2d, ValidationError> {
    match padding {
        Conv2dPadding::Explicit(explicit) => Ok(*explicit),
        Conv2dPadding::Auto(auto_pad) => Ok(Padding2d::from_axes(
            calculate_conv_transpose2d_padding(
                *auto_pad,
                input.height,
                filter.height,
                strides.height,
                dilations.height,
                output_padding.height,
            )?,
            calculate_conv_transpose2d_padding(
                *auto_pad,
                input.width,
                filter.width,
                strides.width,
                dilations.width,
                output_padding.width,
            )?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_same_upper_odd_total() {
        // input 5, filter 4, stride 1: needed = 4 + 4 = 8, total 3
        let padding = calculate_conv2d_padding(AutoPad::SameUpper, 5, 4, 1, 1).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 1,
                ending: 2
            }
        );
    }

    #[test]
    fn test_same_lower_odd_total() {
        let padding = calculate_conv2d_padding(AutoPad::SameLower, 5, 4, 1, 1).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 2,
                ending: 1
            }
        );
    }

    #[test]
    fn test_same_padding_with_stride() {
        // input 7, filter 3, stride 2: output 4, needed 3*2 + 3 = 9, total 2
        let padding = calculate_conv2d_padding(AutoPad::SameUpper, 7, 3, 2, 1).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 1,
                ending: 1
            }
        );
    }

    #[test]
    fn test_same_padding_never_negative() {
        // input 8, filter 1, stride 4: needed = 1*4 + 1 = 5 < 8
        let padding = calculate_conv2d_padding(AutoPad::SameUpper, 8, 1, 4, 1).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 0,
                ending: 0
            }
        );
    }

    #[test]
    fn test_same_padding_with_dilation() {
        // effective kernel = (3-1)*2+1 = 5, total 4
        let padding = calculate_conv2d_padding(AutoPad::SameLower, 10, 3, 1, 2).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 2,
                ending: 2
            }
        );
    }

    #[test]
    fn test_effective_kernel_overflow() {
        let err = calculate_conv2d_padding(AutoPad::SameUpper, 10, u32::MAX, 1, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn test_zero_filter_size_is_rejected() {
        assert!(calculate_conv2d_padding(AutoPad::SameUpper, 10, 0, 1, 1).is_err());
    }

    #[test]
    fn test_transposed_padding() {
        // stride 2, input 4, kernel 3, output padding 1: 6 + 3 + 1 - 8 = 2
        let padding =
            calculate_conv_transpose2d_padding(AutoPad::SameUpper, 4, 3, 2, 1, 1).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 1,
                ending: 1
            }
        );

        // 6 + 4 + 1 - 8 = 3
        let padding =
            calculate_conv_transpose2d_padding(AutoPad::SameLower, 4, 4, 2, 1, 1).unwrap();
        assert_eq!(
            padding,
            PaddingSizes {
                beginning: 2,
                ending: 1
            }
        );
    }

    #[test]
    fn test_transposed_padding_underflow() {
        // kernel 1, stride 2: 2*3 + 1 + 0 - 8 < 0
        let err =
            calculate_conv_transpose2d_padding(AutoPad::SameUpper, 4, 1, 2, 1, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn test_resolve_explicit_passes_through() {
        let explicit = Padding2d::new(Size2d::new(1, 2), Size2d::new(3, 4));
        let resolved = resolve_conv2d_padding(
            &Conv2dPadding::Explicit(explicit),
            Size2d::new(1, 1),
            Size2d::new(u32::MAX, u32::MAX),
            Size2d::new(1, 1),
            Size2d::new(9, 9),
        )
        .unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_resolve_auto_per_axis() {
        let resolved = resolve_conv2d_padding(
            &Conv2dPadding::Auto(AutoPad::SameUpper),
            Size2d::new(5, 7),
            Size2d::new(4, 3),
            Size2d::new(1, 2),
            Size2d::new(1, 1),
        )
        .unwrap();
        assert_eq!(resolved.height(), PaddingSizes { beginning: 1, ending: 2 });
        assert_eq!(resolved.width(), PaddingSizes { beginning: 1, ending: 1 });
    }
}
