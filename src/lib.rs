//! # nearpick
//!
//! `nearpick` is a Rust library for nearest-point picking, designed to be used in Rust
//! as well as compiled to WebAssembly (WASM). It answers "which known points are
//! closest to this location" against a static point set, at the latency an
//! interactive viewer needs for cursor hit-testing.
//!
//! ## Features
//!
//! - **WASM-first**: Built with `wasm-bindgen` for seamless integration with JavaScript and TypeScript.
//! - **Balanced construction**: The k-d tree is built once with linear-time median
//!   selection per level, then never mutated.
//! - **Bounded queries**: Every query caps both the number of results (`k`) and the
//!   search radius, with branch-and-bound pruning keeping traversal near `O(log N)`.
//! - **Parallel batches**: Many queries against the same immutable tree run
//!   concurrently via `rayon`.
//!
//! ## Main Interface
//!
//! The primary entry point is the generic [`KdTree`], built from any value type plus a
//! coordinate-extraction function. Viewers working with flat coordinate buffers can use
//! the [`Picker2D`] and [`Picker3D`] wrappers, which map cursor positions to point indices.

mod kdtree;
mod neighbors;
mod wasm;

pub use kdtree::BuildError;
pub use kdtree::KdTree;
pub use wasm::d2::Picker2D;
pub use wasm::d3::Picker3D;
