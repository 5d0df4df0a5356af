#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Hash primitives.

pub mod hash;
