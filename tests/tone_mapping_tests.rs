//! Shader variant derivation tests (no GPU required).

use afterglow::{
    FrameSettings, OutputColorSpace, ShaderDefines, ToneMappingMode, output_shader_defines,
};

#[test]
fn every_mode_derives_the_expected_define() {
    let cases = [
        (ToneMappingMode::None, None),
        (ToneMappingMode::Linear, Some("LINEAR")),
        (ToneMappingMode::Reinhard, Some("REINHARD")),
        (ToneMappingMode::Cineon, Some("CINEON")),
        (ToneMappingMode::AcesFilmic, Some("ACES_FILMIC")),
    ];

    for (mode, expected) in cases {
        let frame = FrameSettings {
            tone_mapping: mode,
            ..FrameSettings::default()
        };
        let defines = output_shader_defines(&frame);
        assert_eq!(
            defines.get("TONE_MAPPING_MODE"),
            expected,
            "wrong define for {}",
            mode.name()
        );
    }
}

#[test]
fn at_most_one_curve_selected() {
    // A define set can only hold one value per key, so conflicting curve
    // selections are unrepresentable. Verify the derivation never sneaks a
    // second curve key in.
    for mode in ToneMappingMode::all() {
        let frame = FrameSettings {
            tone_mapping: *mode,
            output_color_space: OutputColorSpace::Linear,
            ..FrameSettings::default()
        };
        let defines = output_shader_defines(&frame);
        let curve_keys = defines
            .iter()
            .filter(|(k, _)| k.contains("TONE_MAPPING"))
            .count();
        assert!(curve_keys <= 1);
    }
}

#[test]
fn srgb_transfer_tracks_output_color_space() {
    let srgb = output_shader_defines(&FrameSettings::default());
    assert!(srgb.contains("SRGB_TRANSFER"));

    let linear = output_shader_defines(&FrameSettings {
        output_color_space: OutputColorSpace::Linear,
        ..FrameSettings::default()
    });
    assert!(!linear.contains("SRGB_TRANSFER"));
}

#[test]
fn derivation_is_stateless_across_calls() {
    // Switching the mode between calls must not leak the previous variant.
    let mut frame = FrameSettings {
        tone_mapping: ToneMappingMode::Reinhard,
        ..FrameSettings::default()
    };
    assert_eq!(
        output_shader_defines(&frame).get("TONE_MAPPING_MODE"),
        Some("REINHARD")
    );

    frame.tone_mapping = ToneMappingMode::None;
    assert_eq!(output_shader_defines(&frame).get("TONE_MAPPING_MODE"), None);

    frame.tone_mapping = ToneMappingMode::Cineon;
    assert_eq!(
        output_shader_defines(&frame).get("TONE_MAPPING_MODE"),
        Some("CINEON")
    );
}

#[test]
fn identical_settings_hash_identically() {
    let a = output_shader_defines(&FrameSettings {
        tone_mapping: ToneMappingMode::AcesFilmic,
        ..FrameSettings::default()
    });
    let b = output_shader_defines(&FrameSettings {
        tone_mapping: ToneMappingMode::AcesFilmic,
        exposure: 2.5, // exposure is a uniform, not a define
        ..FrameSettings::default()
    });
    assert_eq!(a, b);
    assert_eq!(a.compute_hash(), b.compute_hash());
}

#[test]
fn manual_define_sets_merge_deterministically() {
    let mut base = ShaderDefines::new();
    base.set("TONE_MAPPING_MODE", "LINEAR");

    let mut extra = ShaderDefines::new();
    extra.set("SRGB_TRANSFER", "1");
    extra.set("TONE_MAPPING_MODE", "REINHARD");

    base.merge(&extra);
    assert_eq!(base.get("TONE_MAPPING_MODE"), Some("REINHARD"));
    assert!(base.contains("SRGB_TRANSFER"));
}
