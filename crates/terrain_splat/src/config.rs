//! Splat packing and materialization settings.
//!
//! [`SplatConfig`] is shared by [`crate::splat::ChannelPacker`] and
//! [`crate::tile::Materializer`]. Build it with the `with_*` methods and call
//! [`SplatConfig::validate`] before the first pass.
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::splat::SplatMode;
use crate::tile::TextureFormat;

pub const DEFAULT_CONTROL_TEXTURE: &str = "_ControlTex0";
pub const DEFAULT_CUTOUT_TEXTURE: &str = "_Texture_Additional_Masks";

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct SplatConfig {
    pub mode: SplatMode,
    /// Material slot names for [`SplatMode::Custom`].
    pub control_texture_names: Vec<String>,
    /// Depth of the welded border in pixels. 0 disables welding.
    pub weld_margin: usize,
    /// Scale applied to world positions before cluster lookup.
    pub cluster_noise_scale: f32,
    /// Apply the ease curve to cluster blend weights.
    pub smooth_falloff: bool,
    pub texture_format: TextureFormat,
    /// Material slot name of cutout textures.
    pub cutout_texture_name: String,
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            mode: SplatMode::Custom,
            control_texture_names: vec![DEFAULT_CONTROL_TEXTURE.to_string()],
            weld_margin: 1,
            cluster_noise_scale: 0.05,
            smooth_falloff: false,
            texture_format: TextureFormat::Rgba32,
            cutout_texture_name: DEFAULT_CUTOUT_TEXTURE.to_string(),
        }
    }
}

impl SplatConfig {
    pub fn new(mode: SplatMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: SplatMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_control_texture_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.control_texture_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weld_margin(mut self, margin: usize) -> Self {
        self.weld_margin = margin;
        self
    }

    pub fn with_cluster_noise_scale(mut self, scale: f32) -> Self {
        self.cluster_noise_scale = scale;
        self
    }

    pub fn with_smooth_falloff(mut self, on: bool) -> Self {
        self.smooth_falloff = on;
        self
    }

    pub fn with_texture_format(mut self, format: TextureFormat) -> Self {
        self.texture_format = format;
        self
    }

    pub fn with_cutout_texture_name(mut self, name: impl Into<String>) -> Self {
        self.cutout_texture_name = name.into();
        self
    }

    /// Control texture names for the first `count` texture slots of the current mode.
    pub fn texture_names(&self, count: usize) -> Vec<String> {
        self.mode.texture_names(count, &self.control_texture_names)
    }

    /// Number of control textures for a largest channel index of `max_index`.
    pub fn texture_count(&self, max_index: usize) -> usize {
        self.mode
            .texture_count(max_index, self.control_texture_names.len())
    }

    pub fn welding_enabled(&self) -> bool {
        self.weld_margin > 0
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cluster_noise_scale.is_finite() || self.cluster_noise_scale < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "cluster_noise_scale must be finite and >= 0, got {}",
                self.cluster_noise_scale
            )));
        }
        if self.cutout_texture_name.is_empty() {
            return Err(Error::InvalidConfig(
                "cutout_texture_name must not be empty".into(),
            ));
        }
        if self.mode == SplatMode::Custom {
            if self.control_texture_names.is_empty() {
                return Err(Error::InvalidConfig(
                    "custom mode needs at least one control texture name".into(),
                ));
            }
            let mut seen = HashSet::new();
            for name in &self.control_texture_names {
                if name.is_empty() {
                    return Err(Error::InvalidConfig(
                        "control texture names must not be empty".into(),
                    ));
                }
                if !seen.insert(name.as_str()) || *name == self.cutout_texture_name {
                    return Err(Error::InvalidConfig(format!(
                        "texture name '{name}' is used more than once"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = SplatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.texture_names(1), vec![DEFAULT_CONTROL_TEXTURE]);
        assert!(config.welding_enabled());
    }

    #[test]
    fn rejects_negative_noise_scale() {
        let config = SplatConfig::default().with_cluster_noise_scale(-1.0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_and_duplicate_custom_names() {
        let empty = SplatConfig::default().with_control_texture_names(Vec::<String>::new());
        assert!(empty.validate().is_err());

        let dup = SplatConfig::default().with_control_texture_names(["_A", "_A"]);
        assert!(dup.validate().is_err());

        let clash = SplatConfig::default().with_control_texture_names([DEFAULT_CUTOUT_TEXTURE]);
        assert!(clash.validate().is_err());
    }

    #[test]
    fn named_modes_ignore_custom_names() {
        let config =
            SplatConfig::new(SplatMode::Cts).with_control_texture_names(Vec::<String>::new());
        assert!(config.validate().is_ok());
        assert_eq!(config.texture_count(7), 2);
        assert_eq!(config.texture_names(2), vec!["_Texture_Splat_1", "_Texture_Splat_2"]);
    }

    #[test]
    fn zero_margin_disables_welding() {
        assert!(!SplatConfig::default().with_weld_margin(0).welding_enabled());
    }
}
