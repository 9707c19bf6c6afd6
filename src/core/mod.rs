/// This module provides the chunk-oriented writer abstraction.
pub mod item;

/// This module provides the restartable stream lifecycle and its
/// driver-facing execution context.
pub mod stream;
