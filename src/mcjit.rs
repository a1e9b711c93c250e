// This module is the concrete linking backend, selected once at build configuration
// time: MCJIT is the execution engine the LLVM C API carried by the dependency stack
// exposes, so it is the one backend compiled in (there is no second runtime branch).
// Each submitted unit gets its own execution engine; the backend owns all of them, plus
// the engine-wide symbol map that implements resolution tiers two through four. Tier one
// (definitions inside the unit being linked) is handled by MCJIT itself, which binds
// module-local definitions before consulting external resolution. All compiled code
// memory is released only when the backend drops, and within each unit the owning
// context drops after the code compiled from it.

//! MCJIT-backed compilation and symbol resolution.

use std::collections::HashMap;
use std::ffi::CString;

use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Linkage;
use inkwell::targets::{TargetData, TargetMachine};
use llvm_sys::support::{LLVMLoadLibraryPermanently, LLVMSearchForAddressOfSymbol};

use crate::error::{JitError, JitResult};
use crate::intrinsics::{IntrinsicTable, NativeSymbol};
use crate::module_unit::ModuleUnit;
use crate::target::HostTarget;

/// A compiled unit: the execution engine holding its machine code and the
/// module/context pair it was compiled from, kept alive together.
#[derive(Debug)]
struct CompiledUnit {
    _engine: ExecutionEngine<'static>,
    _unit: ModuleUnit,
}

/// The MCJIT backend: target description, intrinsic table, compiled units,
/// and the symbol map for the module resolution tiers.
#[derive(Debug)]
pub(crate) struct McjitBackend {
    host: HostTarget,
    target_machine: TargetMachine,
    target_data: TargetData,
    intrinsics: IntrinsicTable,
    /// Addresses of every externally visible function compiled so far, by
    /// IR-level name. A later definition of a name replaces an earlier one.
    symbols: HashMap<String, usize>,
    units: Vec<CompiledUnit>,
}

/// Look a symbol up among the host process image and its loaded libraries.
///
/// LLVM's search applies the target ABI's platform-specific prefixing
/// underneath, so callers pass IR-level names.
fn process_symbol(name: &str) -> Option<usize> {
    let c_name = CString::new(name).ok()?;
    let addr = unsafe { LLVMSearchForAddressOfSymbol(c_name.as_ptr()) };
    if addr.is_null() {
        None
    } else {
        Some(addr as usize)
    }
}

impl McjitBackend {
    pub(crate) fn new(intrinsics: Vec<NativeSymbol>) -> JitResult<Self> {
        let host = HostTarget::probe()?;
        let target_machine = host.create_target_machine()?;
        let target_data = target_machine.get_target_data();

        // Make the process image and its loaded libraries searchable, so
        // tier three can resolve exported host symbols.
        unsafe { LLVMLoadLibraryPermanently(std::ptr::null()) };

        let intrinsics = IntrinsicTable::build(intrinsics)?;

        log::debug!(
            "engine up: triple={} cpu={} intrinsics={}",
            host.triple_str(),
            host.cpu(),
            intrinsics.len()
        );

        Ok(Self {
            host,
            target_machine,
            target_data,
            intrinsics,
            symbols: HashMap::new(),
            units: Vec::new(),
        })
    }

    /// Compile and link one unit, retaining its code for the backend's
    /// lifetime.
    pub(crate) fn add_module(&mut self, unit: ModuleUnit) -> JitResult<()> {
        let module_name = unit.name().to_string();
        let module = unit.module();

        // Stamp the unit with the engine's target description so the data
        // layout the front end assumed is the one compilation uses.
        module.set_triple(&self.target_machine.get_triple());
        let layout = self.target_data.get_data_layout();
        module.set_data_layout(&layout);

        module.verify().map_err(|e| JitError::InvalidModule {
            module: module_name.clone(),
            message: e.to_string(),
        })?;

        let engine = module
            .create_jit_execution_engine(self.host.opt_level())
            .map_err(|e| JitError::EngineCreation {
                module: module_name.clone(),
                message: e.to_string(),
            })?;

        // Pre-bind every external declaration through tiers two to four, in
        // chain order. Mappings must be installed before the first address
        // request finalizes the unit's code.
        for function in module.get_functions() {
            if function.count_basic_blocks() != 0 {
                continue;
            }
            let symbol = function.get_name().to_string_lossy().into_owned();
            if symbol.starts_with("llvm.") {
                continue;
            }
            match self.resolve(&symbol) {
                Some(address) => {
                    log::trace!("bound '{symbol}' at {address:#x} for '{module_name}'");
                    engine.add_global_mapping(&function, address);
                }
                None => {
                    return Err(JitError::UnresolvedReference {
                        symbol,
                        module: module_name,
                    })
                }
            }
        }
        for global in module.get_globals() {
            if !global.is_declaration() {
                continue;
            }
            let symbol = global.get_name().to_string_lossy().into_owned();
            match self.resolve(&symbol) {
                Some(address) => engine.add_global_mapping(&global.as_pointer_value(), address),
                None => {
                    return Err(JitError::UnresolvedReference {
                        symbol,
                        module: module_name,
                    })
                }
            }
        }

        // Materialize and record every externally visible defined function.
        // Recording after compilation keeps the chain deterministic: the
        // unit being linked never resolves against itself through the map.
        let mut compiled = 0usize;
        for function in module.get_functions() {
            if function.count_basic_blocks() == 0 || function.get_linkage() != Linkage::External {
                continue;
            }
            let symbol = function.get_name().to_string_lossy().into_owned();
            let address =
                engine
                    .get_function_address(&symbol)
                    .map_err(|e| JitError::Materialize {
                        symbol: symbol.clone(),
                        module: module_name.clone(),
                        message: e.to_string(),
                    })?;
            self.symbols.insert(symbol, address);
            compiled += 1;
        }

        log::debug!("compiled module '{module_name}': {compiled} symbols retained");
        self.units.push(CompiledUnit {
            _engine: engine,
            _unit: unit,
        });
        Ok(())
    }

    /// Walk the resolution chain in fixed order: compiled modules, then the
    /// host process image, then the intrinsic table.
    pub(crate) fn resolve(&self, name: &str) -> Option<usize> {
        if let Some(&address) = self.symbols.get(name) {
            return Some(address);
        }
        if let Some(address) = process_symbol(name) {
            return Some(address);
        }
        self.intrinsics.address_of(name)
    }

    pub(crate) fn has_symbol(&self, name: &str) -> bool {
        self.intrinsics.contains(name)
    }

    pub(crate) fn host(&self) -> &HostTarget {
        &self.host
    }

    pub(crate) fn target_machine(&self) -> &TargetMachine {
        &self.target_machine
    }

    pub(crate) fn target_data(&self) -> &TargetData {
        &self.target_data
    }

    pub(crate) fn intrinsics(&self) -> &IntrinsicTable {
        &self.intrinsics
    }

    pub(crate) fn module_count(&self) -> usize {
        self.units.len()
    }
}
