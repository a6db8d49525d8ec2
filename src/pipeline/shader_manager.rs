//! Shader Template Manager
//!
//! WGSL sources are minijinja templates embedded in the binary; shared
//! snippets sit in the `chunks/` subdirectory and are pulled in with
//! `{$ include "name" $}` (the path-join callback prefixes `chunks/`
//! automatically). The [`ShaderManager`] deduplicates compiled modules by
//! hashing the expanded WGSL.

use minijinja::{Environment, Error, ErrorKind, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use xxhash_rust::xxh3::xxh3_128;

use super::shader_gen::ShaderGenerator;
use crate::defines::ShaderDefines;

#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
const TEMPLATE_DIR: &str = "src/pipeline/shaders";

#[derive(RustEmbed)]
#[folder = "src/pipeline/shaders"]
struct ShaderAssets;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// The process-wide template environment.
///
/// WGSL uses `{{` and `@binding(...)` syntax of its own, so the template
/// syntax is shifted to `{$ ... $}` blocks and `$$` line statements to stay
/// out of the shader's way.
pub fn template_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
            .expect("Failed to configure template syntax");

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);
        env.set_loader(load_template);
        env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());
        env
    })
}

fn load_template(name: &str) -> Result<Option<String>, Error> {
    let filename = if name.ends_with(".wgsl") {
        name.to_string()
    } else {
        format!("{name}.wgsl")
    };

    // In native debug builds, prefer the on-disk file so shader edits show
    // up without recompiling.
    #[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
    {
        let path = std::path::Path::new(TEMPLATE_DIR).join(&filename);
        if path.exists() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("Failed to read {}: {e}", path.display()),
                )
            });
        }
    }

    let Some(file) = ShaderAssets::get(&filename) else {
        return Ok(None);
    };
    match std::str::from_utf8(file.data.as_ref()) {
        Ok(source) => Ok(Some(source.to_string())),
        Err(e) => Err(Error::new(
            ErrorKind::TemplateNotFound,
            format!("{filename} is not valid UTF-8: {e}"),
        )),
    }
}

/// Shader module cache.
///
/// Keys are xxh3-128 hashes of the **expanded** WGSL, so two passes whose
/// templates render to identical code share one `wgpu::ShaderModule`.
pub struct ShaderManager {
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl Default for ShaderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            module_cache: FxHashMap::default(),
        }
    }

    /// Expands `template_name` with `defines` and compiles the result,
    /// returning a cached module when the expanded source was seen before.
    ///
    /// Returns `(module, source_hash)`; the hash is a stable key for
    /// pipeline caches built on top.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        template_name: &str,
        defines: &ShaderDefines,
    ) -> (&wgpu::ShaderModule, u128) {
        let source = ShaderGenerator::generate_shader(template_name, defines);
        let hash = xxh3_128(source.as_bytes());

        let module = self.module_cache.entry(hash).or_insert_with(|| {
            log::debug!(
                "Compiling shader module '{template_name}' ({} defines)",
                defines.len()
            );
            log::trace!("Generated WGSL for '{template_name}':\n{source}");
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("Shader Module {template_name}")),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });

        (module, hash)
    }

    /// Number of distinct compiled modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.module_cache.len()
    }
}
