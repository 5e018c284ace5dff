//! newlib のリエントラント構造体
//!
//! newlib はスレッドごとの `struct _reent` を各 `_xxx_r` 関数に渡し、
//! エラー値はグローバルな errno ではなくその構造体へ書き込ませる。
//! 先頭フィールドが `_errno` であることだけを前提にする。

use core::ffi::c_int;

use crate::error::{Errno, Result};
use crate::util::irq::IrqMutex;

/// `struct _reent` の先頭部分
#[repr(C)]
#[derive(Debug, Default)]
pub struct Reent {
    /// `_errno`
    pub errno: c_int,
}

impl Reent {
    /// エラー値が未設定の構造体を作成
    pub const fn new() -> Self {
        Self { errno: 0 }
    }

    /// エラー値を設定
    pub fn set_errno(&mut self, err: Errno) {
        self.errno = err.code();
    }

    /// 現在のエラー値を取得
    pub fn errno(&self) -> Errno {
        Errno::new(self.errno)
    }

    /// Result を C の戻り値に変換する
    ///
    /// エラーの場合は errno を記録し、`failure` を返す。
    /// 成功時は errno に触れない。
    pub fn complete<T>(&mut self, result: Result<T>, failure: T) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.set_errno(err);
                failure
            }
        }
    }

    /// 失敗時に -1 を返す int 版
    pub fn ret_int(&mut self, result: Result<c_int>) -> c_int {
        self.complete(result, -1)
    }

    /// 失敗時に -1 を返す ssize_t 版
    pub fn ret_size(&mut self, result: Result<usize>) -> isize {
        self.complete(result.map(|n| n as isize), -1)
    }
}

/// Rust 側で保持する非リエントラント呼び出し用のエラー値
static GLOBAL_REENT: IrqMutex<Reent> = IrqMutex::new(Reent::new());

#[cfg(feature = "export-symbols")]
extern "C" {
    /// newlib のグローバルなリエントラント構造体
    static mut _impure_ptr: *mut Reent;
}

/// 非リエントラント版の関数（`_kill` など）が使うエラーコンテキストで処理する
///
/// newlib にリンクされている場合は `_impure_ptr` を使い、
/// そうでなければクレート内の構造体を使う。
pub fn with_global<R>(f: impl FnOnce(&mut Reent) -> R) -> R {
    #[cfg(feature = "export-symbols")]
    {
        // newlib の起動後は _impure_ptr が有効な構造体を指している
        let impure = unsafe { *core::ptr::addr_of!(_impure_ptr) };
        if let Some(reent) = unsafe { impure.as_mut() } {
            return f(reent);
        }
    }
    f(&mut *GLOBAL_REENT.lock())
}

/// 非リエントラント呼び出しが最後に記録したエラー値
pub fn global_errno() -> Errno {
    with_global(|reent| reent.errno())
}
