#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! newlib 向けシステムコールグルーコード
//!
//! newlib が要求する `_xxx_r` 系のエントリポイントを、スケジューラ・VFS・
//! コンソール・電源管理・タイマーといった OS 側のサービスへ転送する。

/// エラー型定義
pub mod error;

/// newlib のリエントラント構造体
pub mod reent;

/// C ランタイムと共有する型
pub mod types;

/// ヒープ管理
pub mod mem;

/// 外部サービスのインターフェースと参照実装
pub mod service;

/// システムコール本体
pub mod syscall;

/// newlib から呼ばれる C ABI エントリポイント
pub mod newlib;

/// ユーティリティモジュール
pub mod util;

pub use error::{Errno, Result};
pub use mem::{BumpHeap, HeapRegion};
pub use reent::Reent;
pub use syscall::{install, installed, Services, Syscalls};
