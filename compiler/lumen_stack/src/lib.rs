//! Stack growth for the recursive passes of the Lumen toolchain.
//!
//! Parsing, type computation, conflict detection, and lowering all walk the
//! syntax tree recursively. Deeply nested programs (long chains of
//! parenthesized blocks, generated code) would otherwise overflow the native
//! stack, so every recursive entry point wraps its body in
//! [`ensure_sufficient_stack`].
//!
//! The evaluator does not need this: it executes flattened step plans on an
//! explicit frame stack and never recurses through the tree.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
