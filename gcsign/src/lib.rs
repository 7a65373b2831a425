#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use gcsign_core::*;

#[cfg(all(feature = "default-context", not(target_arch = "wasm32")))]
mod context;
#[cfg(all(feature = "default-context", not(target_arch = "wasm32")))]
pub use context::{default_context, DefaultContext};

#[cfg(feature = "storage")]
pub mod storage;
