// This module is the public execution engine surface. JitEngine owns the target
// description, the intrinsic table, and all compiled code memory; it accepts IR modules,
// compiles and links them against the tiered resolution chain, and answers symbol
// address queries for its whole lifetime. The facade delegates to the one concrete
// backend compiled in (see mcjit.rs). Mutating operations take &mut self, so callers
// sharing an engine across threads must serialize them; the read-only accessors are safe
// for unsynchronized readers because the descriptor and table are immutable after
// construction.

//! The public JIT engine interface.

use std::mem;

use inkwell::targets::{TargetData, TargetMachine};

use crate::error::{assert_success, JitResult};
use crate::intrinsics::{IntrinsicTable, NativeSymbol};
use crate::mcjit::McjitBackend;
use crate::module_unit::ModuleUnit;
use crate::target::HostTarget;

/// Construction-time configuration for a [`JitEngine`].
///
/// Intrinsic providers hand their symbol lists over here, which makes
/// initialization order explicit and the construction step independently
/// testable. The list is consumed when the engine is built.
#[derive(Debug, Default)]
pub struct EngineConfig {
    pub intrinsics: Vec<NativeSymbol>,
}

impl EngineConfig {
    /// A configuration preloaded with the default runtime math symbols.
    pub fn with_default_runtime() -> Self {
        Self {
            intrinsics: crate::runtime::default_symbols(),
        }
    }
}

/// A resolved symbol: a callable native address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitSymbol {
    address: usize,
}

impl JitSymbol {
    pub(crate) fn new(address: usize) -> Self {
        Self { address }
    }

    pub fn address(self) -> usize {
        self.address
    }

    /// Cast the address to a callable function pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure `F` is a function pointer type matching the
    /// signature the symbol was compiled with, and that the engine the symbol
    /// came from is still alive when the function is invoked.
    pub unsafe fn as_fn<F: Copy>(self) -> F {
        unsafe { mem::transmute_copy(&self.address) }
    }
}

/// The JIT execution engine.
///
/// Construct once per process (or lazily on first use); construction performs
/// one-time host-feature probing. The engine is not internally synchronized
/// and its LLVM handles are not `Send`, so share it behind an exclusive lock
/// or keep one engine per worker thread.
#[derive(Debug)]
pub struct JitEngine {
    backend: McjitBackend,
}

impl JitEngine {
    /// Build an engine: probe the host, construct the target machine, and
    /// populate the intrinsic table from `config`.
    pub fn new(config: EngineConfig) -> JitResult<Self> {
        Ok(Self {
            backend: McjitBackend::new(config.intrinsics)?,
        })
    }

    /// Compile `unit` against the engine's target description, link its
    /// unresolved references through the resolution chain, and retain the
    /// resulting code for the engine's lifetime.
    ///
    /// Blocking: returns only after compile-and-link has fully completed.
    /// Failure means the submitted IR is defective, not that retrying could
    /// help.
    pub fn add_module(&mut self, unit: ModuleUnit) -> JitResult<()> {
        self.backend.add_module(unit)
    }

    /// Resolve `name` by walking the chain in fixed order: previously
    /// compiled modules, then host process exports, then intrinsics.
    ///
    /// No match is an internal-invariant violation: generated code only
    /// references names one of the tiers guarantees.
    pub fn find_symbol(&self, name: &str) -> JitResult<JitSymbol> {
        self.backend
            .resolve(name)
            .map(JitSymbol::new)
            .ok_or_else(|| crate::error::JitError::SymbolNotFound {
                name: name.to_string(),
            })
    }

    /// Address-only variant of [`find_symbol`](Self::find_symbol); aborts
    /// with a diagnostic if the symbol is missing.
    pub fn symbol_address(&self, name: &str) -> usize {
        assert_success(self.find_symbol(name), "symbol lookup failed").address()
    }

    /// Whether `name` is a registered runtime intrinsic.
    ///
    /// Deliberately narrower than [`find_symbol`](Self::find_symbol): this
    /// answers "guaranteed, statically known intrinsic", not "some address
    /// that happens to resolve".
    pub fn has_symbol(&self, name: &str) -> bool {
        self.backend.has_symbol(name)
    }

    /// The target machine modules are compiled against. Stable immediately
    /// after construction.
    pub fn target_machine(&self) -> &TargetMachine {
        self.backend.target_machine()
    }

    /// The data layout shared by the front end and the engine. Stable
    /// immediately after construction.
    pub fn target_data(&self) -> &TargetData {
        self.backend.target_data()
    }

    /// The probed host description.
    pub fn host(&self) -> &HostTarget {
        self.backend.host()
    }

    pub fn intrinsics(&self) -> &IntrinsicTable {
        self.backend.intrinsics()
    }

    /// How many units have been compiled into this engine.
    pub fn module_count(&self) -> usize {
        self.backend.module_count()
    }
}
