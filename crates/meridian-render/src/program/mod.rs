//! Shader sources, program layouts and the program cache.

mod cache;
mod configuration;
mod layout;
mod program;
mod shaders;

pub use cache::{ProgramCache, ProgramKey};
pub use configuration::{PaintBinder, PaintProperty, ProgramConfiguration};
pub use layout::{program_layout, ProgramLayout};
pub use program::{DrawCall, ProgramInstance};
pub use shaders::{ShaderId, ShaderLibrary, ShaderSource};

/// Placeholder sources for every shader.
#[cfg(test)]
pub(crate) fn test_shaders() -> ShaderLibrary {
    let mut library = ShaderLibrary::new();
    for id in ShaderId::ALL {
        library.insert(id, format!("// {id} vertex"), format!("// {id} fragment"));
    }
    library
}
