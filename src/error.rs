// This module defines error types for the texjit engine using the thiserror crate for
// idiomatic Rust error handling. JitError is the main error enum covering the failure
// taxonomy: host detection and target machine construction (environment-probe errors),
// duplicate intrinsic registration, module build/verification/compile/link failures
// (which embed the underlying LLVM diagnostic text), and symbol lookup misses. The
// module also provides JitResult<T> as a convenience alias and assert_success, which
// restores the reference semantics of aborting with a descriptive message at call sites
// that do not explicitly intercept an error.

//! Error types for the texjit engine.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for JIT engine operations.
///
/// None of these are expected to be handled by ordinary callers: they signal
/// environment defects or malformed IR from an upstream compiler, not
/// recoverable runtime conditions. Callers that want the reference
/// abort-on-failure behavior wrap results in [`assert_success`].
#[derive(Error, Debug)]
pub enum JitError {
    #[error("Host target detection failed: {reason}")]
    HostDetection {
        reason: String,
    },

    #[error("Target machine construction failed for triple {triple}")]
    TargetMachine {
        triple: String,
    },

    #[error("Duplicate intrinsic symbol: {name}")]
    DuplicateIntrinsic {
        name: String,
    },

    #[error("Failed to build module '{module}': {message}")]
    ModuleBuild {
        module: String,
        message: String,
    },

    #[error("Module '{module}' failed verification: {message}")]
    InvalidModule {
        module: String,
        message: String,
    },

    #[error("Failed to add module '{module}' to compile layer: {message}")]
    EngineCreation {
        module: String,
        message: String,
    },

    #[error("Unresolved symbol '{symbol}' referenced by module '{module}'")]
    UnresolvedReference {
        symbol: String,
        module: String,
    },

    #[error("Failed to materialize symbol '{symbol}' in module '{module}': {message}")]
    Materialize {
        symbol: String,
        module: String,
        message: String,
    },

    #[error("Symbol not found in any resolution tier: {name}")]
    SymbolNotFound {
        name: String,
    },
}

/// Result type alias for engine operations.
pub type JitResult<T> = Result<T, JitError>;

/// Unwrap a [`JitResult`], aborting with a formatted diagnostic on failure.
///
/// Every error in this crate indicates a configuration or upstream-compiler
/// defect, so the default posture at a call site is to terminate loudly.
/// Callers that want graceful degradation match on the `Result` instead.
pub fn assert_success<T>(result: JitResult<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::error!("{what}: {err}");
            panic!("{what}: {err}");
        }
    }
}
