use serde::{Deserialize, Serialize};

/// Height/width pair used for strides, dilations, window and output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size2d<T> {
    pub height: T,
    pub width: T,
}

impl<T> Size2d<T> {
    pub fn new(height: T, width: T) -> Self {
        Self { height, width }
    }
}

/// Begin/end padding for one spatial axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingSizes {
    pub beginning: u32,
    pub ending: u32,
}

/// Explicit padding for both spatial axes of a 2-D window operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding2d {
    pub beginning: Size2d<u32>,
    pub ending: Size2d<u32>,
}

impl Padding2d {
    pub fn new(beginning: Size2d<u32>, ending: Size2d<u32>) -> Self {
        Self { beginning, ending }
    }

    pub fn from_axes(height: PaddingSizes, width: PaddingSizes) -> Self {
        Self {
            beginning: Size2d::new(height.beginning, width.beginning),
            ending: Size2d::new(height.ending, width.ending),
        }
    }

    pub fn height(&self) -> PaddingSizes {
        PaddingSizes {
            beginning: self.beginning.height,
            ending: self.ending.height,
        }
    }

    pub fn width(&self) -> PaddingSizes {
        PaddingSizes {
            beginning: self.beginning.width,
            ending: self.ending.width,
        }
    }
}

/// Layout of 4-D activation tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOperandLayout {
    /// Channels-first: [batch, channels, height, width]
    Nchw,
    /// Channels-last: [batch, height, width, channels]
    Nhwc,
}

/// Layout of conv2d filter tensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conv2dFilterLayout {
    /// [out_channels, in_channels/groups, height, width]
    Oihw,
    /// [height, width, in_channels/groups, out_channels]
    Hwio,
    /// [out_channels, height, width, in_channels/groups]
    Ohwi,
    /// [in_channels/groups, height, width, out_channels]
    Ihwo,
}

/// Layout of convTranspose2d filter tensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvTranspose2dFilterLayout {
    /// [in_channels, out_channels/groups, height, width]
    Iohw,
    /// [height, width, out_channels/groups, in_channels]
    Hwoi,
    /// [out_channels/groups, height, width, in_channels]
    Ohwi,
}

/// A 4-D activation shape split into its named axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InputLayoutInfo {
    pub batches: u32,
    pub channels: u32,
    pub height: u32,
    pub width: u32,
}

impl InputOperandLayout {
    /// Caller must have checked that `shape` is 4-D.
    pub(crate) fn decompose(self, shape: &[u32]) -> InputLayoutInfo {
        match self {
            InputOperandLayout::Nchw => InputLayoutInfo {
                batches: shape[0],
                channels: shape[1],
                height: shape[2],
                width: shape[3],
            },
            InputOperandLayout::Nhwc => InputLayoutInfo {
                batches: shape[0],
                channels: shape[3],
                height: shape[1],
                width: shape[2],
            },
        }
    }

    pub(crate) fn compose(self, batches: u32, channels: u32, height: u32, width: u32) -> Vec<u32> {
        match self {
            InputOperandLayout::Nchw => vec![batches, channels, height, width],
            InputOperandLayout::Nhwc => vec![batches, height, width, channels],
        }
    }

    pub(crate) fn channel_axis(self) -> usize {
        match self {
            InputOperandLayout::Nchw => 1,
            InputOperandLayout::Nhwc => 3,
        }
    }
}

/// A 4-D filter shape split into its named axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FilterLayoutInfo {
    pub input_channels: u32,
    pub output_channels: u32,
    pub height: u32,
    pub width: u32,
}

impl Conv2dFilterLayout {
    pub(crate) fn decompose(self, shape: &[u32]) -> FilterLayoutInfo {
        let (output_channels, input_channels, height, width) = match self {
            Conv2dFilterLayout::Oihw => (shape[0], shape[1], shape[2], shape[3]),
            Conv2dFilterLayout::Hwio => (shape[3], shape[2], shape[0], shape[1]),
            Conv2dFilterLayout::Ohwi => (shape[0], shape[3], shape[1], shape[2]),
            Conv2dFilterLayout::Ihwo => (shape[3], shape[0], shape[1], shape[2]),
        };
        FilterLayoutInfo {
            input_channels,
            output_channels,
            height,
            width,
        }
    }
}

impl ConvTranspose2dFilterLayout {
    /// `output_channels` is the per-group count.
    pub(crate) fn decompose(self, shape: &[u32]) -> FilterLayoutInfo {
        let (input_channels, output_channels, height, width) = match self {
            ConvTranspose2dFilterLayout::Iohw => (shape[0], shape[1], shape[2], shape[3]),
            ConvTranspose2dFilterLayout::Hwoi => (shape[3], shape[2], shape[0], shape[1]),
            ConvTranspose2dFilterLayout::Ohwi => (shape[3], shape[0], shape[1], shape[2]),
        };
        FilterLayoutInfo {
            input_channels,
            output_channels,
            height,
            width,
        }
    }
}
