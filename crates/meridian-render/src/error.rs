use thiserror::Error;

use crate::atlas::ImageError;
use crate::gl::UniformKind;
use crate::program::ShaderId;

/// Hard failures surfaced by [`Painter::render`](crate::render::Painter::render).
///
/// Missing tiles, buckets or atlas entries are not errors; draw routines
/// skip them and the next frame picks them up.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no shader source registered for `{0}`")]
    MissingShader(ShaderId),

    #[error("program `{name}` failed to compile: {log}")]
    ProgramCompile { name: String, log: String },

    #[error("program `{program}` has no uniform `{uniform}`")]
    UnknownUniform { program: String, uniform: String },

    #[error("uniform `{uniform}` expects {expected:?}, got {actual:?}")]
    UniformTypeMismatch {
        uniform: String,
        expected: UniformKind,
        actual: UniformKind,
    },

    #[error("graphics context lost")]
    ContextLost,

    #[error(transparent)]
    Image(#[from] ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
