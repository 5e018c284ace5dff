//! システムコール
//!
//! `Syscalls` が外部サービスへの参照をまとめて持ち、各システムコールを
//! そのまま転送する。newlib のエントリポイントはインストール済みの
//! インスタンスを `installed` で取り出して呼ぶ。
//!
//! ファイル操作と時刻取得は Cargo feature で実装を切り替える:
//! - `vfs`: VFS へ転送（無効時はコンソールのみ）
//! - `timer`: 単調クロックから時刻を計算（無効時は ENOSYS）

use spin::Once;

use crate::error::{Errno, Result};
use crate::mem::BumpHeap;
use crate::service::{Console, PowerOff, Scheduler, Signals};
use crate::util::irq;

#[cfg(feature = "timer")]
use crate::service::MonotonicClock;
#[cfg(feature = "vfs")]
use crate::service::Vfs;

pub mod fs;
pub mod process;
pub mod time;

pub use fs::{ConsoleFiles, FileOps, VfsFiles};
pub use time::{ClockTime, NoClock, TimeOfDay};

/// このビルドで使うファイル操作の実装
#[cfg(feature = "vfs")]
pub type Files<'a> = VfsFiles<'a>;
/// このビルドで使うファイル操作の実装
#[cfg(not(feature = "vfs"))]
pub type Files<'a> = ConsoleFiles<'a>;

/// このビルドで使う時刻取得の実装
#[cfg(feature = "timer")]
pub type Time<'a> = ClockTime<'a>;
/// このビルドで使う時刻取得の実装
#[cfg(not(feature = "timer"))]
pub type Time<'a> = NoClock;

/// システムコール層が転送先として使うサービス
pub struct Services<'a> {
    /// 実行中スレッドの問い合わせ先
    pub scheduler: &'a dyn Scheduler,
    /// コンソール（ログ出力にも使う）
    pub console: &'a dyn Console,
    /// 電源管理
    pub power: &'a dyn PowerOff,
    /// シグナル配送（通常は `NoSignals`）
    pub signals: &'a dyn Signals,
    /// ヒープ
    pub heap: &'a BumpHeap,
    /// 仮想ファイルシステム
    #[cfg(feature = "vfs")]
    pub vfs: &'a dyn Vfs,
    /// 単調クロック
    #[cfg(feature = "timer")]
    pub clock: &'a dyn MonotonicClock,
}

/// システムコール本体
pub struct Syscalls<'a> {
    scheduler: &'a dyn Scheduler,
    console: &'a dyn Console,
    power: &'a dyn PowerOff,
    signals: &'a dyn Signals,
    heap: &'a BumpHeap,
    files: Files<'a>,
    time: Time<'a>,
}

#[cfg(feature = "vfs")]
fn files<'a>(services: &Services<'a>) -> Files<'a> {
    VfsFiles::new(services.vfs)
}

#[cfg(not(feature = "vfs"))]
fn files<'a>(services: &Services<'a>) -> Files<'a> {
    ConsoleFiles::new(services.console)
}

#[cfg(feature = "timer")]
fn time<'a>(services: &Services<'a>) -> Time<'a> {
    ClockTime::new(services.clock)
}

#[cfg(not(feature = "timer"))]
fn time<'a>(_services: &Services<'a>) -> Time<'a> {
    NoClock
}

impl<'a> Syscalls<'a> {
    /// サービスを束ねてシステムコール層を作成
    pub fn new(services: Services<'a>) -> Self {
        Self {
            files: files(&services),
            time: time(&services),
            scheduler: services.scheduler,
            console: services.console,
            power: services.power,
            signals: services.signals,
            heap: services.heap,
        }
    }

    /// コンソール
    pub fn console(&self) -> &'a dyn Console {
        self.console
    }

    /// ヒープ
    pub fn heap(&self) -> &'a BumpHeap {
        self.heap
    }

    /// newlib の初期化処理（`_init`）
    ///
    /// コンソールを初期化する
    pub fn init(&self) {
        self.console.init();
    }
}

/// インストール済みのシステムコール層
static SYSCALLS: Once<Syscalls<'static>> = Once::new();

/// newlib のエントリポイントが使うシステムコール層を登録
///
/// # 戻り値
/// 登録したインスタンス。既に登録済みの場合は EBUSY、
/// 割込みを無効化する手段がないターゲットでは ENOSYS
pub fn install(syscalls: Syscalls<'static>) -> Result<&'static Syscalls<'static>> {
    if !irq::is_supported() {
        return Err(Errno::ENOSYS);
    }
    let mut fresh = false;
    let sys = SYSCALLS.call_once(|| {
        fresh = true;
        syscalls
    });
    if fresh {
        crate::info!("newlib syscalls installed");
        Ok(sys)
    } else {
        crate::warn!("newlib syscalls already installed");
        Err(Errno::EBUSY)
    }
}

/// 登録済みのシステムコール層を取得
pub fn installed() -> Option<&'static Syscalls<'static>> {
    SYSCALLS.get()
}
