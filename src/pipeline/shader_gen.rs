//! Shader Code Generator
//!
//! Renders a WGSL template plus a macro define set into final shader code.

use std::collections::BTreeMap;

use serde::Serialize;

use super::shader_manager::template_env;
use crate::defines::ShaderDefines;

#[derive(Serialize)]
struct ShaderContext {
    #[serde(flatten)]
    defines: BTreeMap<String, String>,
}

pub struct ShaderGenerator;

impl ShaderGenerator {
    /// Expands `template_name` with `defines` as the template context.
    ///
    /// A missing template or a template error is a programming error and
    /// panics; shader sources ship inside the binary and are not
    /// user-supplied.
    #[must_use]
    pub fn generate_shader(template_name: &str, defines: &ShaderDefines) -> String {
        let env = template_env();

        let ctx = ShaderContext {
            defines: defines.to_map(),
        };

        let template = env
            .get_template(template_name)
            .expect("Shader template not found");

        let source = template.render(&ctx).expect("Shader render failed");

        format!("// === Auto-generated Shader ===\n{source}")
    }
}
