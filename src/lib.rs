//! texjit - JIT execution for tensor-expression kernels.
//!
//! texjit turns compiler-generated LLVM IR modules into native machine code
//! for the host CPU and exposes callable addresses for the compiled symbols.
//! It probes host hardware once at construction, keeps code generation and
//! compilation consistent through a single target description, and links
//! every unresolved reference through a fixed four-tier resolution chain:
//! module-local definitions, previously compiled modules, host process
//! exports, and the runtime intrinsic table.
//!
//! # Primary Usage
//!
//! ```ignore
//! use texjit::{EngineConfig, JitEngine, ModuleUnit};
//!
//! let mut engine = JitEngine::new(EngineConfig::with_default_runtime())?;
//!
//! // The front end reads the target description first so its codegen
//! // assumptions match compilation, then submits a finished module.
//! let layout = engine.target_data();
//! let unit = ModuleUnit::build("kernel", |ctx, module| {
//!     /* build IR with the inkwell context and builder */
//!     Ok::<_, std::convert::Infallible>(())
//! })?;
//! engine.add_module(unit)?;
//!
//! let plus_one: unsafe extern "C" fn(i32) -> i32 =
//!     unsafe { engine.find_symbol("plus_one")?.as_fn() };
//! ```
//!
//! # Architecture
//!
//! - [`engine`] - Public engine facade: module submission and symbol queries
//!   (the concrete linking backend behind it is selected at build
//!   configuration time and stays private)
//! - [`target`] - Host CPU probing and target machine construction
//! - [`intrinsics`] - The runtime intrinsic registry
//! - [`runtime`] - Native intrinsic bodies, including parallel dispatch
//! - [`module_unit`] - Atomic IR module + owning context units
//! - [`error`] - Error taxonomy and the abort-by-default helper
//!
//! # Concurrency
//!
//! Compilation is synchronous and the engine is not internally synchronized:
//! `add_module` takes `&mut self`, and the engine's LLVM handles are not
//! `Send`. Keep one engine per worker thread, or serialize all access behind
//! a lock. Read-only accessors on a constructed engine are safe for
//! unsynchronized readers.

pub mod engine;
pub mod error;
pub mod intrinsics;
mod mcjit;
pub mod module_unit;
pub mod runtime;
pub mod target;

pub use engine::{EngineConfig, JitEngine, JitSymbol};
pub use error::{assert_success, JitError, JitResult};
pub use intrinsics::{IntrinsicTable, NativeSymbol};
pub use module_unit::ModuleUnit;
pub use runtime::{default_symbols, PARALLEL_DISPATCH_SYMBOL};
pub use target::{FpFusion, HostTarget};

// Re-exported so front ends build IR against the same binding versions the
// engine compiles with.
pub use inkwell;
