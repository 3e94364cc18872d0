//! Intonaco - In-memory host for Affresco.
//!
//! The intonaco is the fresh plaster layer a fresco is painted into. This
//! crate is the plainest surface the renderer can paint on: a real node
//! store (parents, ordered children, element text runs, prop maps) that
//! also records every mutation in an ordered operation log. Tests assert
//! against the log and the structure; examples use it as a host that needs
//! no terminal or browser.

mod memory;

pub use memory::{HostOp, MemoryHost};
