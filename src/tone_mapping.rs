//! Tone Mapping & Per-Frame Configuration
//!
//! [`ToneMappingMode`] selects the HDR compression curve compiled into the
//! output shader. [`FrameSettings`] bundles everything a pass may read about
//! the current frame — tone mapping, exposure, output color space, and the
//! per-channel auto-clear flags — and is passed explicitly per render call
//! rather than living on a global renderer object.

use crate::defines::ShaderDefines;

/// Tone mapping algorithm selection.
///
/// Different algorithms provide different looks:
///
/// - [`None`](ToneMappingMode::None): passthrough (LDR workflows, debugging)
/// - [`Linear`](ToneMappingMode::Linear): exposure multiply + clamp
/// - [`Reinhard`](ToneMappingMode::Reinhard): classic operator, soft highlight rolloff
/// - [`Cineon`](ToneMappingMode::Cineon): optimized filmic curve with toe
/// - [`AcesFilmic`](ToneMappingMode::AcesFilmic): industry standard filmic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMappingMode {
    /// No tone mapping (colors pass through unchanged)
    #[default]
    None,
    /// Exposure multiply with clamp
    Linear,
    /// Reinhard operator (classic, soft highlights)
    Reinhard,
    /// Optimized Cineon film emulation
    Cineon,
    /// ACES Filmic (industry standard)
    AcesFilmic,
}

impl ToneMappingMode {
    /// Applies the mode to a shader define set.
    ///
    /// Sets the `TONE_MAPPING_MODE` macro to the matching value; `None`
    /// sets nothing, which compiles the passthrough variant. One enum value
    /// maps to at most one define value, so conflicting curve selections
    /// are unrepresentable.
    pub fn apply_to_defines(self, defines: &mut ShaderDefines) {
        let mode_str = match self {
            Self::None => return,
            Self::Linear => "LINEAR",
            Self::Reinhard => "REINHARD",
            Self::Cineon => "CINEON",
            Self::AcesFilmic => "ACES_FILMIC",
        };
        defines.set("TONE_MAPPING_MODE", mode_str);
    }

    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Linear => "Linear",
            Self::Reinhard => "Reinhard",
            Self::Cineon => "Cineon",
            Self::AcesFilmic => "ACES Filmic",
        }
    }

    /// Returns all available tone mapping modes.
    #[must_use]
    pub const fn all() -> &'static [ToneMappingMode] {
        &[
            Self::None,
            Self::Linear,
            Self::Reinhard,
            Self::Cineon,
            Self::AcesFilmic,
        ]
    }
}

/// Output color space of the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputColorSpace {
    /// Linear output (e.g. for further LDR processing)
    Linear,
    /// sRGB-encoded output (typical display surfaces)
    #[default]
    Srgb,
}

/// Per-frame rendering configuration.
///
/// Supplied explicitly to every pass via
/// [`FrameContext`](crate::pass::FrameContext) — the mode, exposure, and
/// color space are re-read on every render call, so changing them between
/// frames takes effect on the very next frame with no sticky state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    /// Selected tone mapping curve.
    pub tone_mapping: ToneMappingMode,
    /// Exposure multiplier applied by the tone-mapping curve.
    pub exposure: f32,
    /// Color space the final image is encoded in.
    pub output_color_space: OutputColorSpace,
    /// Whether a pass's `clear` flag actually clears the color channel.
    pub auto_clear_color: bool,
    /// Whether a pass's `clear` flag actually clears the depth channel
    /// (honored by passes that attach depth; the built-in passes are
    /// color-only).
    pub auto_clear_depth: bool,
    /// Whether a pass's `clear` flag actually clears the stencil channel.
    pub auto_clear_stencil: bool,
    /// Color used when clearing.
    pub clear_color: wgpu::Color,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMappingMode::default(),
            exposure: 1.0,
            output_color_space: OutputColorSpace::default(),
            auto_clear_color: true,
            auto_clear_depth: true,
            auto_clear_stencil: true,
            clear_color: wgpu::Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_mode_sets_no_define() {
        let mut defines = ShaderDefines::new();
        ToneMappingMode::None.apply_to_defines(&mut defines);
        assert!(defines.is_empty());
    }

    #[test]
    fn each_mode_sets_at_most_one_define() {
        for mode in ToneMappingMode::all() {
            let mut defines = ShaderDefines::new();
            mode.apply_to_defines(&mut defines);
            assert!(defines.len() <= 1, "{} set multiple defines", mode.name());
        }
    }

    #[test]
    fn defaults_match_original_renderer() {
        let settings = FrameSettings::default();
        assert_eq!(settings.tone_mapping, ToneMappingMode::None);
        assert!((settings.exposure - 1.0).abs() < f32::EPSILON);
        assert!(settings.auto_clear_color);
    }
}
