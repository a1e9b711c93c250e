// This module contains the natively implemented functions that generated code can call
// without them appearing in any submitted IR module. texjit_parallel_for is the synthetic
// parallel dispatch entry point: generated kernels hand it a per-index callee and a packed
// argument block, and it fans the index range out across worker threads. default_symbols
// provides a small owned list of scalar math kernels so an engine can be constructed with
// a guaranteed math vocabulary without a separate provider crate.

//! Native runtime entry points callable from generated code.

use std::ffi::c_void;
use std::mem;
use std::num::NonZeroUsize;
use std::thread;

use crate::intrinsics::NativeSymbol;

/// Name under which the synthetic parallel dispatch entry point is always
/// registered, independent of the provider list.
pub const PARALLEL_DISPATCH_SYMBOL: &str = "texjit_parallel_for";

/// Signature generated code uses for per-index kernels handed to
/// [`texjit_parallel_for`]: `(index, packed_args)`.
type KernelFn = unsafe extern "C" fn(i64, *mut u8);

#[derive(Clone, Copy)]
struct SendPtr(*mut u8);

// The packed argument block is shared read/write across workers; generated
// kernels partition it by index, which is the caller's contract.
unsafe impl Send for SendPtr {}
unsafe impl Sync for SendPtr {}

/// Fan per-index invocations of `kernel` over `[start, end)` out across
/// worker threads.
///
/// Runs inline when the range is empty, the host has a single hardware
/// thread, or the range is too small to split. Each index is invoked exactly
/// once; the call returns only after every index has completed.
///
/// # Safety
///
/// `kernel` must be a valid function of type `extern "C" fn(i64, *mut u8)`
/// and must tolerate concurrent invocation with distinct indices sharing
/// `packed_args`.
pub unsafe extern "C" fn texjit_parallel_for(
    kernel: *const c_void,
    start: i64,
    end: i64,
    packed_args: *mut u8,
) {
    if kernel.is_null() || end <= start {
        return;
    }
    let kernel: KernelFn = unsafe { mem::transmute(kernel) };
    let total = (end - start) as usize;
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(total);

    if workers <= 1 {
        for index in start..end {
            unsafe { kernel(index, packed_args) };
        }
        return;
    }

    let chunk = total.div_ceil(workers) as i64;
    let args = SendPtr(packed_args);
    thread::scope(|scope| {
        for worker in 0..workers as i64 {
            let lo = start + worker * chunk;
            let hi = (lo + chunk).min(end);
            if lo >= hi {
                break;
            }
            scope.spawn(move || {
                // Capture the whole SendPtr, not just its *mut u8 field, so
                // the wrapper's Send impl applies under 2021 disjoint capture.
                let args = args;
                let SendPtr(ptr) = args;
                for index in lo..hi {
                    unsafe { kernel(index, ptr) };
                }
            });
        }
    });
}

pub extern "C" fn texjit_expf(x: f32) -> f32 {
    x.exp()
}

pub extern "C" fn texjit_logf(x: f32) -> f32 {
    x.ln()
}

pub extern "C" fn texjit_log10f(x: f32) -> f32 {
    x.log10()
}

pub extern "C" fn texjit_log2f(x: f32) -> f32 {
    x.log2()
}

pub extern "C" fn texjit_tanhf(x: f32) -> f32 {
    x.tanh()
}

pub extern "C" fn texjit_sigmoidf(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// The fractional part, matching the kernel-language `frac` builtin.
pub extern "C" fn texjit_fracf(x: f32) -> f32 {
    x - x.trunc()
}

/// Default provider list: scalar math kernels every engine can rely on.
///
/// Callers may extend or replace this list before handing it to the engine;
/// the synthetic dispatch entry is never part of it.
pub fn default_symbols() -> Vec<NativeSymbol> {
    vec![
        NativeSymbol::new("texjit_expf", texjit_expf as usize),
        NativeSymbol::new("texjit_logf", texjit_logf as usize),
        NativeSymbol::new("texjit_log10f", texjit_log10f as usize),
        NativeSymbol::new("texjit_log2f", texjit_log2f as usize),
        NativeSymbol::new("texjit_tanhf", texjit_tanhf as usize),
        NativeSymbol::new("texjit_sigmoidf", texjit_sigmoidf as usize),
        NativeSymbol::new("texjit_fracf", texjit_fracf as usize),
    ]
}
