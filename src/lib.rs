//! Public library API for streaming serialized game zones into memory blocks.

/// Block model, byte sources, reference relocation, and the load engine.
pub mod zone;
