//! Shader Generation & Module Cache
//!
//! WGSL sources are minijinja templates embedded in the binary. A pass hands
//! the [`ShaderManager`] a template name plus its [`ShaderDefines`]; the
//! manager expands the template, hashes the final WGSL, and returns a cached
//! `wgpu::ShaderModule` (compiling it on first sight).

pub mod shader_gen;
pub mod shader_manager;

pub use shader_gen::ShaderGenerator;
pub use shader_manager::ShaderManager;
