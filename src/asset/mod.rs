//! Asset transforms shared by tasks.

pub mod minify;
