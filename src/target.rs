// This module probes the executing host and produces the immutable target description
// that drives native code generation. HostTarget captures the process triple, host CPU
// name, subtarget feature string, a balanced default codegen optimization level, and the
// floating-point fusion policy. The description is built once per engine instance and is
// read by both the front end (before building a module, so codegen assumptions match)
// and the engine backend (during compilation). Native-target initialization in LLVM is
// process-global and non-reentrant, so it is guarded by a OnceLock.

//! Host target probing and target machine construction.

use std::fmt;
use std::sync::OnceLock;

use inkwell::targets::{
    CodeModel, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple,
};
use inkwell::OptimizationLevel;

use crate::error::{JitError, JitResult};

/// Floating-point operation fusion policy carried by the target description.
///
/// The LLVM C API does not expose the fusion knob on target machine
/// construction, so the policy is descriptor data: front ends honor it by
/// setting fast-math flags on the floating-point instructions they emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpFusion {
    /// Fuse freely wherever profitable (the default for generated kernels).
    Fast,
    /// Fuse only where the IR explicitly permits contraction.
    Standard,
    /// Never fuse.
    Strict,
}

/// Immutable description of the executing host, suitable for driving native
/// code generation.
///
/// Deterministic for a fixed host: two probes on the same machine produce an
/// identical triple, CPU name, and feature string.
pub struct HostTarget {
    triple: TargetTriple,
    cpu: String,
    features: String,
    opt_level: OptimizationLevel,
    fp_fusion: FpFusion,
}

fn initialize_native_once() -> JitResult<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| Target::initialize_native(&InitializationConfig::default()))
        .clone()
        .map_err(|reason| JitError::HostDetection { reason })
}

impl HostTarget {
    /// Probe the host CPU and build the target description.
    ///
    /// Fails only if host introspection itself is unavailable, which is a
    /// fatal environment error: engine construction cannot proceed without it.
    pub fn probe() -> JitResult<Self> {
        initialize_native_once()?;

        let triple = TargetMachine::get_default_triple();
        let cpu = TargetMachine::get_host_cpu_name()
            .to_str()
            .map_err(|e| JitError::HostDetection {
                reason: format!("host CPU name is not valid UTF-8: {e}"),
            })?
            .to_owned();
        let features = TargetMachine::get_host_cpu_features()
            .to_str()
            .map_err(|e| JitError::HostDetection {
                reason: format!("host CPU feature string is not valid UTF-8: {e}"),
            })?
            .to_owned();

        log::debug!(
            "probed host target: triple={} cpu={} ({} feature flags)",
            triple.as_str().to_string_lossy(),
            cpu,
            features.split(',').filter(|f| !f.is_empty()).count()
        );

        Ok(Self {
            triple,
            cpu,
            features,
            // Relocation and code model are left at their JIT defaults; the
            // codegen level stays balanced rather than aggressive.
            opt_level: OptimizationLevel::Default,
            fp_fusion: FpFusion::Fast,
        })
    }

    /// Materialize a target machine from this description.
    pub fn create_target_machine(&self) -> JitResult<TargetMachine> {
        let target = Target::from_triple(&self.triple).map_err(|e| JitError::HostDetection {
            reason: e.to_string(),
        })?;
        target
            .create_target_machine(
                &self.triple,
                &self.cpu,
                &self.features,
                self.opt_level,
                RelocMode::Default,
                CodeModel::JITDefault,
            )
            .ok_or_else(|| JitError::TargetMachine {
                triple: self.triple_str(),
            })
    }

    pub fn triple(&self) -> &TargetTriple {
        &self.triple
    }

    /// The triple as an owned string, for diagnostics and comparisons.
    pub fn triple_str(&self) -> String {
        self.triple.as_str().to_string_lossy().into_owned()
    }

    pub fn cpu(&self) -> &str {
        &self.cpu
    }

    /// The raw LLVM feature string, e.g. `+sse2,+cx16,-avx512f,...`.
    pub fn features(&self) -> &str {
        &self.features
    }

    /// The subset of feature flags the host actually enables.
    pub fn enabled_features(&self) -> Vec<&str> {
        self.features
            .split(',')
            .filter_map(|f| f.strip_prefix('+'))
            .collect()
    }

    pub fn opt_level(&self) -> OptimizationLevel {
        self.opt_level
    }

    pub fn fp_fusion(&self) -> FpFusion {
        self.fp_fusion
    }
}

impl fmt::Debug for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostTarget")
            .field("triple", &self.triple_str())
            .field("cpu", &self.cpu)
            .field("opt_level", &self.opt_level)
            .field("fp_fusion", &self.fp_fusion)
            .finish_non_exhaustive()
    }
}
