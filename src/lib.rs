pub mod checked;
pub mod error;
pub mod operand;
pub mod shape_inference;

pub use checked::{Checked, CheckedInt};
pub use error::{ErrorKind, ValidationError};
pub use operand::{DataType, Operand};
pub use shape_inference::{
    ArgMinMaxAttributes, ArgMinMaxKind, AutoPad, BatchNormalizationAttributes,
    Conv2dAttributes, Conv2dFilterLayout, Conv2dPadding, ConvTranspose2dAttributes,
    ConvTranspose2dFilterLayout, ElementwiseBinaryKind, GemmAttributes, InputOperandLayout,
    InstanceNormalizationAttributes, InterpolationMode, LayerNormalizationAttributes,
    PadAttributes, PadMode, Padding2d, PaddingSizes, Pool2dAttributes, Pool2dKind,
    ReduceAttributes, ReduceKind, Resample2dAttributes, ResampleTarget, RoundingType, Size2d,
    SplitSpec, broadcast_shapes, calculate_conv_transpose2d_padding, calculate_conv2d_padding,
    infer_arg_min_max, infer_batch_normalization, infer_concat, infer_conv_transpose2d,
    infer_conv2d, infer_elementwise_binary, infer_expand, infer_gather, infer_gemm,
    infer_global_pool2d, infer_instance_normalization, infer_layer_normalization, infer_matmul,
    infer_pad, infer_pool2d, infer_prelu, infer_reduce, infer_resample2d, infer_reshape,
    infer_slice, infer_softmax, infer_split, infer_tile, infer_transpose, infer_where,
    validate_axes, validate_axis,
};
