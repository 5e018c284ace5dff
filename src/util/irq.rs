//! 割込み制御と割込み安全なロック
//!
//! シングルコアのターゲットでは、割込みを無効化している間は
//! 割込みハンドラからの再入が起きない。ヒープカーソルのような
//! 割込みコンテキストからも触られる状態はこのロック越しに扱う。

use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard, Once};

use crate::error::{Errno, Result};

/// アーキテクチャ固有の割込み許可・禁止
///
/// x86_64 のベアメタル以外のターゲットでは、OS がこれを実装して
/// `set_control` で登録する
pub trait InterruptControl: Sync {
    /// 割込みを無効化し、直前に許可されていたかを返す
    fn disable(&self) -> bool;

    /// 割込みを許可する
    fn enable(&self);
}

/// 登録済みの割込み制御
static CONTROL: Once<&'static dyn InterruptControl> = Once::new();

/// 割込み制御を登録する
///
/// ロックを使う前（`install` より前）に一度だけ呼ぶこと
///
/// # 戻り値
/// 既に登録済みの場合は EBUSY
pub fn set_control(control: &'static dyn InterruptControl) -> Result<()> {
    let mut fresh = false;
    CONTROL.call_once(|| {
        fresh = true;
        control
    });
    if fresh {
        Ok(())
    } else {
        Err(Errno::EBUSY)
    }
}

/// 割込みを無効化できるかどうか
///
/// 割込みのないホスト環境では常に true。ベアメタルでは
/// 組み込みの実装があるか、`set_control` で登録済みの場合だけ true
pub fn is_supported() -> bool {
    CONTROL.get().is_some()
        || cfg!(all(target_arch = "x86_64", target_os = "none"))
        || cfg!(not(target_os = "none"))
}

/// 割込みを無効化し、直前の割込み許可状態を返す
#[inline]
pub fn disable() -> bool {
    if let Some(control) = CONTROL.get() {
        return control.disable();
    }
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    {
        let enabled = x86_64::instructions::interrupts::are_enabled();
        x86_64::instructions::interrupts::disable();
        enabled
    }
    #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
    {
        false
    }
}

/// `disable` が返した状態に割込み許可を戻す
#[inline]
pub fn restore(enabled: bool) {
    if !enabled {
        return;
    }
    if let Some(control) = CONTROL.get() {
        control.enable();
        return;
    }
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    x86_64::instructions::interrupts::enable();
}

/// 割込みを無効化した状態でクロージャを実行
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let state = disable();
    let ret = f();
    restore(state);
    ret
}

/// CPU を停止し続ける（戻らない）
pub fn halt() -> ! {
    loop {
        #[cfg(all(target_arch = "x86_64", target_os = "none"))]
        x86_64::instructions::hlt();
        #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
        core::hint::spin_loop();
    }
}

/// 割込み安全なミューテックス
///
/// ロック取得前に割込みを無効化し、ガードのドロップ時に
/// ロックを解放してから割込み状態を復元する
pub struct IrqMutex<T> {
    inner: Mutex<T>,
}

impl<T> IrqMutex<T> {
    /// 新しいミューテックスを作成
    pub const fn new(data: T) -> Self {
        Self {
            inner: Mutex::new(data),
        }
    }

    /// ロックを取得（割込みを無効化）
    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        let interrupt_enabled = disable();
        IrqMutexGuard {
            guard: ManuallyDrop::new(self.inner.lock()),
            interrupt_enabled,
        }
    }

    /// 中身を取り出す
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// `IrqMutex` のガード
pub struct IrqMutexGuard<'a, T> {
    guard: ManuallyDrop<MutexGuard<'a, T>>,
    interrupt_enabled: bool,
}

impl<T> Deref for IrqMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for IrqMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for IrqMutexGuard<'_, T> {
    fn drop(&mut self) {
        // ロックを先に解放してから割込みを戻す
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        restore(self.interrupt_enabled);
    }
}
