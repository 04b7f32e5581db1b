use tracing::{debug, trace};

use crate::checked::Checked;
use crate::error::ValidationError;
use crate::operand::{DataType, Operand};
use crate::shape_inference::layout::{
    Conv2dFilterLayout, ConvTranspose2dFilterLayout, InputOperandLayout, PaddingSizes, Size2d,
};
use crate::shape_inference::padding::{
    Conv2dPadding, effective_kernel_size, resolve_conv_transpose2d_padding,
    resolve_conv2d_padding,
};
use crate::shape_inference::{
    check_floating_point, check_positive_size2d, check_rank, check_same_data_type,
};

/// Attributes of conv2d
#[derive(Debug, Clone, PartialEq)]
pub struct Conv2dAttributes {
    pub padding: Conv2dPadding,
    pub strides: Size2d<u32>,
    pub dilations: Size2d<u32>,
    pub groups: u32,
    pub input_layout: InputOperandLayout,
    pub filter_layout: Conv2dFilterLayout,
    pub bias: Option<Operand>,
}

/// Attributes of convTranspose2d
#[derive(Debug, Clone, PartialEq)]
pub struct ConvTranspose2dAttributes {
    pub padding: Conv2dPadding,
    pub strides: Size2d<u32>,
    pub dilations: Size2d<u32>,
    pub output_padding: Size2d<u32>,
    /// Explicit spatial output size, overriding the computed one.
    pub output_sizes: Option<Size2d<u32>>,
    pub groups: u32,
    pub input_layout: InputOperandLayout,
    pub filter_layout: ConvTranspose2dFilterLayout,
    pub bias: Option<Operand>,
}

/// Output size of a sliding window along one axis:
/// `(input + begin + end - effective_window) / stride + 1`.
///
/// Computed in `f64`, which represents every `u32` exactly, so callers can
/// round it either way. The padded input must cover the effective window.
pub(crate) fn calculate_window_output_size(
    operator: &str,
    input_size: u32,
    window_size: u32,
    padding: PaddingSizes,
    stride: u32,
    dilation: u32,
) -> Result<f64, ValidationError> {
    let effective_window = effective_kernel_size(window_size, dilation).ok_or_overflow(|| {
        format!(
            "{} effective window size is too large (window {}, dilation {})",
            operator, window_size, dilation
        )
    })?;

    let padded_input =
        f64::from(input_size) + f64::from(padding.beginning) + f64::from(padding.ending);
    if padded_input < f64::from(effective_window) {
        return Err(ValidationError::shape(format!(
            "{}: padded input size {} is smaller than effective window size {}",
            operator, padded_input, effective_window
        )));
    }

    let output_size = (padded_input - f64::from(effective_window)) / f64::from(stride) + 1.0;
    if output_size > f64::from(u32::MAX) {
        return Err(ValidationError::overflow(format!(
            "{}: output size {} does not fit in 32 bits",
            operator, output_size
        )));
    }
    Ok(output_size)
}

fn check_bias(
    bias: Option<&Operand>,
    data_type: DataType,
    output_channels: u32,
    operator: &str,
) -> Result<(), ValidationError> {
    let Some(bias) = bias else {
        return Ok(());
    };
    check_same_data_type(bias, data_type, &format!("{} bias", operator))?;
    check_rank(bias, 1, &format!("{} bias", operator))?;
    if bias.shape[0] != output_channels {
        return Err(ValidationError::shape(format!(
            "{} bias length {} must equal output channels {}",
            operator, bias.shape[0], output_channels
        )));
    }
    Ok(())
}

fn check_window_attributes(
    operator: &str,
    strides: Size2d<u32>,
    dilations: Size2d<u32>,
    groups: u32,
) -> Result<(), ValidationError> {
    check_positive_size2d(strides, &format!("{} strides", operator))?;
    check_positive_size2d(dilations, &format!("{} dilations", operator))?;
    if groups == 0 {
        return Err(ValidationError::attribute(format!(
            "{} groups must be > 0",
            operator
        )));
    }
    Ok(())
}

/// Infer the output operand of a 2-D convolution.
///
/// Following the W3C WebNN specification for conv2d:
/// https://www.w3.org/TR/webnn/#api-mlgraphbuilder-conv2d
pub fn infer_conv2d(
    input: &Operand,
    filter: &Operand,
    attributes: &Conv2dAttributes,
) -> Result<Operand, ValidationError> {
    check_rank(input, 4, "Conv2d input")?;
    check_floating_point(input, "Conv2d input")?;
    check_rank(filter, 4, "Conv2d filter")?;
    check_same_data_type(filter, input.data_type, "Conv2d filter")?;
    check_window_attributes(
        "Conv2d",
        attributes.strides,
        attributes.dilations,
        attributes.groups,
    )?;

    let input_info = attributes.input_layout.decompose(&input.shape);
    let filter_info = attributes.filter_layout.decompose(&filter.shape);

    if input_info.channels % attributes.groups != 0 {
        return Err(ValidationError::shape(format!(
            "Conv2d input channels {} must be divisible by groups {}",
            input_info.channels, attributes.groups
        )));
    }
    if filter_info.input_channels != input_info.channels / attributes.groups {
        return Err(ValidationError::shape(format!(
            "Conv2d filter input channels {} must equal input channels {} / groups {}",
            filter_info.input_channels, input_info.channels, attributes.groups
        )));
    }

    let input_size = Size2d::new(input_info.height, input_info.width);
    let filter_size = Size2d::new(filter_info.height, filter_info.width);
    let padding = resolve_conv2d_padding(
        &attributes.padding,
        input_size,
        filter_size,
        attributes.strides,
        attributes.dilations,
    )?;

    let output_height = calculate_window_output_size(
        "Conv2d",
        input_size.height,
        filter_size.height,
        padding.height(),
        attributes.strides.height,
        attributes.dilations.height,
    )?;
    let output_width = calculate_window_output_size(
        "Conv2d",
        input_size.width,
        filter_size.width,
        padding.width(),
        attributes.strides.width,
        attributes.dilations.width,
    )?;
    trace!(output_height, output_width, ?padding, "conv2d output sizes");

    let output_channels = filter_info.output_channels;
    check_bias(
        attributes.bias.as_ref(),
        input.data_type,
        output_channels,
        "Conv2d",
    )?;

    Operand::new(
        input.data_type,
        attributes.input_layout.compose(
            input_info.batches,
            output_channels,
            output_height.floor() as u32,
            output_width.floor() as u32,
        ),
    )
}

fn conv_transpose2d_output_size(
    input_size: u32,
    filter_size: u32,
    padding: PaddingSizes,
    stride: u32,
    dilation: u32,
    output_padding: u32,
) -> Result<u32, ValidationError> {
    ((Checked::new(input_size) - 1) * stride + effective_kernel_size(filter_size, dilation)
        - padding.beginning
        - padding.ending
        + output_padding)
        .ok_or_overflow(|| {
            format!(
                "ConvTranspose2d output size for input size {} with filter size {}, stride {}, dilation {} and padding [{}, {}] is invalid",
                input_size, filter_size, stride, dilation, padding.beginning, padding.ending
            )
        })
}

fn check_conv_transpose2d_output_size(
    axis_name: &str,
    requested: u32,
    computed: u32,
    stride: u32,
) -> Result<(), ValidationError> {
    if requested == 0 {
        return Err(ValidationError::attribute(format!(
            "ConvTranspose2d output {} must be > 0",
            axis_name
        )));
    }
    let upper_bound = (Checked::new(computed) + stride).ok_or_overflow(|| {
        format!(
            "ConvTranspose2d output {} bound {} + {} overflows",
            axis_name, computed, stride
        )
    })?;
    if requested < computed || requested >= upper_bound {
        let reason = format!(
            "ConvTranspose2d output {} {} must be in [{}, {})",
            axis_name, requested, computed, upper_bound
        );
        debug!(operator = "ConvTranspose2d", %reason, "rejected explicit output sizes");
        return Err(ValidationError::attribute(reason));
    }
    Ok(())
}

/// Infer the output operand of a 2-D transposed convolution.
///
/// Following the W3C WebNN specification for convTranspose2d:
/// https://www.w3.org/TR/webnn/#api-mlgraphbuilder-convtranspose2d
pub fn infer_conv_transpose2d(
    input: &Operand,
    filter: &Operand,
    attributes: &ConvTranspose2dAttributes,
) -> Result<Operand, ValidationError> {
    check_rank(input, 4, "ConvTranspose2d input")?;
    check_floating_point(input, "ConvTranspose2d input")?;
    check_rank(filter, 4, "ConvTranspose2d filter")?;
    check_same_data_type(filter, input.data_type, "ConvTranspose2d filter")?;
    check_window_attributes(
        "ConvTranspose2d",
        attributes.strides,
        attributes.dilations,
        attributes.groups,
    )?;

    let input_info = attributes.input_layout.decompose(&input.shape);
    let filter_info = attributes.filter_layout.decompose(&filter.shape);

    if input_info.channels % attributes.groups != 0 {
        return Err(ValidationError::shape(format!(
            "ConvTranspose2d input channels {} must be divisible by groups {}",
            input_info.channels, attributes.groups
        )));
    }
    if filter_info.input_channels != input_info.channels {
        return Err(ValidationError::shape(format!(
            "ConvTranspose2d filter input channels {} must equal input channels {}",
            filter_info.input_channels, input_info.channels
        )));
    }

    let output_padding = attributes.output_padding;
    if output_padding.height >= attributes.strides.height
        || output_padding.width >= attributes.strides.width
    {
        return Err(ValidationError::attribute(format!(
            "ConvTranspose2d output padding [{}, {}] must be smaller than strides [{}, {}]",
            output_padding.height,
            output_padding.width,
            attributes.strides.height,
            attributes.strides.width
        )));
    }

    let input_size = Size2d::new(input_info.height, input_info.width);
    let filter_size = Size2d::new(filter_info.height, filter_info.width);
    let padding = resolve_conv_transpose2d_padding(
        &attributes.padding,
        input_size,
        filter_size,
        attributes.strides,
        attributes.dilations,
        output_padding,
    )?;

    let (output_height, output_width) = match attributes.output_sizes {
        Some(sizes) => {
            let computed_height = conv_transpose2d_output_size(
                input_size.height,
                filter_size.height,
                padding.height(),
                attributes.strides.height,
                attributes.dilations.height,
                0,
            )?;
            let computed_width = conv_transpose2d_output_size(
                input_size.width,
                filter_size.width,
                padding.width(),
                attributes.strides.width,
                attributes.dilations.width,
                0,
            )?;
            check_conv_transpose2d_output_size(
                "height",
                sizes.height,
                computed_height,
                attributes.strides.height,
            )?;
            check_conv_transpose2d_output_size(
                "width",
                sizes.width,
                computed_width,
                attributes.strides.width,
            )?;
            (sizes.height, sizes.width)
        }
        None => (
            conv_transpose2d_output_size(
                input_size.height,
                filter_size.height,
                padding.height(),
                attributes.strides.height,
                attributes.dilations.height,
                output_padding.height,
            )?,
            conv_transpose2d_output_size(
                input_size.width,
                filter_size.width,
                padding.width(),
                attributes.strides.width,
                attributes.dilations.width,
                output_padding.width,
            )?,
        ),
    };

    let output_channels = (Checked::new(filter_info.output_channels) * attributes.groups)
        .ok_or_overflow(|| {
            format!(
                "ConvTranspose2d output channels {} * groups {} overflows",
                filter_info.output_channels, attributes.groups
            )
        })?;
    check_bias(
        attributes.bias.as_ref(),
        input.data_type,
        output_channels,
        "ConvTranspose2d",
    )?;

    Operand::new(
        input.data_type,
        attributes.input_layout.compose(
            input_info.batches,
            output_channels,
            output_height,
            output_width,
        ),
    )
}
