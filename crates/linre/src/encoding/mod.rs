//! # Encoding Adapter
//!
//! Callers hand over either text or raw bytes. The engines scan bytes, so
//! [`Haystack`] provides the byte view, and maps engine byte offsets back
//! into the caller's representation (characters for text).

mod haystack;

#[doc(inline)]
pub use haystack::*;
