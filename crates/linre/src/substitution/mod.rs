//! # Substitution
//!
//! [`sub`](crate::CompiledPattern::sub), [`subn`](crate::CompiledPattern::subn)
//! and [`split`](crate::CompiledPattern::split), plus [`escape`].
//!
//! ## Example
//!
//! ```rust
//! use linre::{FlagSet, compile};
//!
//! let pattern = compile(r"(\w+)=(\w+)", FlagSet::NONE).unwrap();
//! assert_eq!(pattern.sub(br"\2=\1", b"a=b c=d", 0).unwrap(), b"b=a d=c");
//! ```

mod escape;
#[doc(inline)]
pub use escape::*;

mod replacer;
#[doc(inline)]
pub use replacer::*;

mod split;

mod sub;

mod template;
#[doc(inline)]
pub use template::*;
