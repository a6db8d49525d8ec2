//! Built-in post-processing passes.

mod blend;
mod copy;
mod output;

pub use blend::BlendPass;
pub use copy::CopyPass;
pub use output::{OutputPass, output_shader_defines};
