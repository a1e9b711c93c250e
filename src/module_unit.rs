// This module expresses the coupled lifetime between an IR module and its owning LLVM
// context. A ModuleUnit owns a boxed Context and the Module built from it; the front end
// populates the module inside a scoped closure and the finished pair is submitted to the
// engine as one atomic unit. The context is guaranteed to outlive any code compiled from
// the module because both travel together into the engine and the context is dropped
// last. The lifetime erasure is private: the public closure API never leaks a borrow
// that could outlive the unit, and the boxed context's address is stable across moves.

//! Atomic IR module + owning context units.

use std::fmt;
use std::mem;

use inkwell::context::Context;
use inkwell::module::Module;

use crate::error::{JitError, JitResult};

/// An IR module paired with its owning context, submitted to the engine as
/// one unit.
///
/// Built through [`ModuleUnit::build`], which hands the front end a fresh
/// context and an empty module scoped to a closure. Once built, the module is
/// sealed: only the engine consumes it, and only the resulting symbols remain
/// queryable after compilation.
pub struct ModuleUnit {
    // Field order is load-bearing: the module (and any execution engine that
    // later takes it over) must drop before the context it borrows from.
    module: Module<'static>,
    name: String,
    _context: Box<Context>,
}

impl ModuleUnit {
    /// Create a fresh context and module, let `populate` fill the module in,
    /// and seal the pair into a unit.
    ///
    /// `populate` receives the owning context and the empty module; any error
    /// it reports becomes a fatal [`JitError::ModuleBuild`] carrying its
    /// message.
    pub fn build<E, F>(name: &str, populate: F) -> JitResult<Self>
    where
        E: fmt::Display,
        F: for<'ctx> FnOnce(&'ctx Context, &Module<'ctx>) -> Result<(), E>,
    {
        let context = Box::new(Context::create());
        let module = {
            let module = context.create_module(name);
            populate(context.as_ref(), &module).map_err(|e| JitError::ModuleBuild {
                module: name.to_string(),
                message: e.to_string(),
            })?;
            // The module borrows the boxed context, whose address is stable
            // and which lives in the same unit. No borrow of the short
            // lifetime escapes the closure above.
            unsafe { mem::transmute::<Module<'_>, Module<'static>>(module) }
        };
        Ok(Self {
            module,
            name: name.to_string(),
            _context: context,
        })
    }

    /// The name the unit was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn module(&self) -> &Module<'static> {
        &self.module
    }
}

impl fmt::Debug for ModuleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleUnit")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
