#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Task scheduling on the tokio runtime.

pub mod scheduler;
