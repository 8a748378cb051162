//! Adapters - concrete implementations of the ports.
//!
//! Only the in-memory reference backends and the clocks live here; a
//! relational backend is a different crate's concern.

pub mod clock;
pub mod memory;
