//! Splat layers and their destination channels.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generator::PortId;

/// Channels per packed texture (R, G, B, A).
pub const CHANNELS_PER_TEXTURE: usize = 4;

/// Destination of a layer inside the packed textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelSlot {
    /// Packed texture index.
    pub texture: usize,
    /// Channel inside the texture: 0 = R, 1 = G, 2 = B, 3 = A.
    pub channel: usize,
}

impl ChannelSlot {
    pub fn for_index(index: usize) -> Self {
        Self {
            texture: index / CHANNELS_PER_TEXTURE,
            channel: index % CHANNELS_PER_TEXTURE,
        }
    }
}

/// One named contribution of a splat producer.
///
/// The first layer of a producer is its background. It ignores its input, is filled with full
/// coverage and always blends with opacity 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub input: Option<PortId>,
    pub output: PortId,
    /// Flat channel index; see [`ChannelSlot::for_index`].
    pub index: usize,
    pub opacity: f32,
}

impl Layer {
    pub fn new(name: impl Into<String>, output: impl Into<PortId>) -> Self {
        Self {
            name: name.into(),
            input: None,
            output: output.into(),
            index: 0,
            opacity: 1.0,
        }
    }

    pub fn with_input(mut self, input: impl Into<PortId>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    #[inline]
    pub fn slot(&self) -> ChannelSlot {
        ChannelSlot::for_index(self.index)
    }
}
