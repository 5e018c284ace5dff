//! メモリ管理モジュール
//!
//! newlib の malloc が使うヒープ領域（`_sbrk_r`）

pub mod heap;

pub use heap::{BumpHeap, HeapRegion};
