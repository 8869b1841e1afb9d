//! Poly1305 backends
//!
//! Only the portable `soft` backend exists. A SIMD backend would have to produce tags
//! byte-identical to it on every input before it could be selected here.

pub(crate) mod soft;
