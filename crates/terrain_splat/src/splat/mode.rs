//! Splat modes and the control textures each of them expects.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shader family the control textures are packed for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplatMode {
    /// User-named control textures.
    #[default]
    Custom,
    /// Relief terrain shaders, up to 3 control textures.
    Rtp,
    /// Complete terrain shaders, up to 4 control textures.
    Cts,
    /// Cluster-ranked control and params texture pair.
    MegaSplat,
}

impl SplatMode {
    pub const ALL: [SplatMode; 4] = [
        SplatMode::Custom,
        SplatMode::Rtp,
        SplatMode::Cts,
        SplatMode::MegaSplat,
    ];

    /// Whether this mode ranks clusters instead of packing channels.
    pub fn uses_clusters(self) -> bool {
        matches!(self, SplatMode::MegaSplat)
    }

    /// Number of control textures for a largest channel index of `max_index`.
    ///
    /// `custom_names` is the number of configured names and only limits [`SplatMode::Custom`].
    pub fn texture_count(self, max_index: usize, custom_names: usize) -> usize {
        let needed = max_index / 4 + 1;
        match self {
            SplatMode::Custom => needed.min(custom_names),
            SplatMode::Rtp => needed.min(3),
            SplatMode::Cts => needed.min(4),
            SplatMode::MegaSplat => 2,
        }
    }

    /// Material slot name of control texture `slot`.
    pub fn texture_name(self, slot: usize, custom: &[String]) -> Option<String> {
        match self {
            SplatMode::Custom => custom.get(slot).cloned(),
            SplatMode::Rtp => Some(format!("_Control{}", slot + 1)),
            SplatMode::Cts => Some(format!("_Texture_Splat_{}", slot + 1)),
            SplatMode::MegaSplat => match slot {
                0 => Some("_SplatControl".to_string()),
                1 => Some("_SplatParams".to_string()),
                _ => None,
            },
        }
    }

    /// Names of the first `count` control textures.
    pub fn texture_names(self, count: usize, custom: &[String]) -> Vec<String> {
        (0..count)
            .map_while(|slot| self.texture_name(slot, custom))
            .collect()
    }
}
