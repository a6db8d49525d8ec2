//! Generated-WGSL validation tests.
//!
//! Every shader variant the passes can request is expanded from its template
//! and run through naga's WGSL front end plus the validator, so a broken
//! template fails in CI instead of at first use on a device.

use afterglow::pipeline::ShaderGenerator;
use afterglow::{FrameSettings, OutputColorSpace, ShaderDefines, ToneMappingMode, output_shader_defines};

fn validate_wgsl(source: &str) -> naga::valid::ModuleInfo {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("WGSL parse error: {e}\n---\n{source}"));

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("WGSL validation error: {e:?}\n---\n{source}"))
}

fn entry_points(source: &str) -> Vec<String> {
    let module = naga::front::wgsl::parse_str(source).expect("parse");
    module.entry_points.iter().map(|ep| ep.name.clone()).collect()
}

#[test]
fn output_shader_valid_for_every_variant() {
    for mode in ToneMappingMode::all() {
        for color_space in [OutputColorSpace::Linear, OutputColorSpace::Srgb] {
            let frame = FrameSettings {
                tone_mapping: *mode,
                output_color_space: color_space,
                ..FrameSettings::default()
            };
            let defines = output_shader_defines(&frame);
            let source = ShaderGenerator::generate_shader("output", &defines);
            validate_wgsl(&source);
        }
    }
}

#[test]
fn output_shader_has_both_entry_points() {
    let source = ShaderGenerator::generate_shader("output", &ShaderDefines::new());
    let entries = entry_points(&source);
    assert!(entries.iter().any(|e| e == "vs_main"));
    assert!(entries.iter().any(|e| e == "fs_main"));
}

#[test]
fn copy_shader_valid() {
    let source = ShaderGenerator::generate_shader("copy", &ShaderDefines::new());
    validate_wgsl(&source);
}

#[test]
fn blend_shader_valid() {
    let source = ShaderGenerator::generate_shader("blend", &ShaderDefines::new());
    validate_wgsl(&source);
}

#[test]
fn variant_selection_changes_the_source() {
    let passthrough = ShaderGenerator::generate_shader("output", &ShaderDefines::new());

    let mut aces = ShaderDefines::new();
    ToneMappingMode::AcesFilmic.apply_to_defines(&mut aces);
    let aces_source = ShaderGenerator::generate_shader("output", &aces);

    assert_ne!(passthrough, aces_source);
    assert!(aces_source.contains("rrt_and_odt_fit"));
    assert!(!passthrough.contains("rrt_and_odt_fit"));
}

#[test]
fn exactly_one_tone_map_definition_per_variant() {
    for mode in ToneMappingMode::all() {
        let mut defines = ShaderDefines::new();
        mode.apply_to_defines(&mut defines);
        let source = ShaderGenerator::generate_shader("output", &defines);
        let count = source.matches("fn tone_map(").count();
        assert_eq!(count, 1, "variant {} defines tone_map {count} times", mode.name());
    }
}
