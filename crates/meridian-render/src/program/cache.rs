use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::Result;
use crate::gl::{Backend, Context};

use super::configuration::ProgramConfiguration;
use super::program::ProgramInstance;
use super::shaders::{ShaderId, ShaderLibrary};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    pub shader: ShaderId,
    pub configuration: String,
    pub overdraw_inspector: bool,
}

/// Compiled programs, created on first use and kept for the renderer's lifetime.
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: HashMap<ProgramKey, ProgramInstance>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<B: Backend>(
        &mut self,
        ctx: &mut Context<B>,
        shaders: &ShaderLibrary,
        shader: ShaderId,
        configuration: Option<&ProgramConfiguration>,
        overdraw_inspector: bool,
    ) -> Result<&mut ProgramInstance> {
        let key = ProgramKey {
            shader,
            configuration: configuration.map(ProgramConfiguration::cache_key).unwrap_or_default(),
            overdraw_inspector,
        };

        match self.programs.entry(key) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let program =
                    ProgramInstance::compile(
                        ctx,
                        shaders,
                        shader,
                        configuration,
                        overdraw_inspector,
                    )?;
                Ok(e.insert(program))
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Deletes every program.
    pub fn destroy<B: Backend>(&mut self, ctx: &mut Context<B>) {
        for (_, program) in self.programs.drain() {
            ctx.backend_mut().delete_program(program.id());
        }
    }

    /// Forgets every program without touching the backend. Used after
    /// context loss, when the handles are already gone.
    pub fn clear(&mut self) {
        self.programs.clear();
    }
}
