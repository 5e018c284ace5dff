//! 外部サービスのインターフェース
//!
//! システムコール層自体はスケジューラやファイルシステムを持たない。
//! 各呼び出しは以下のトレイトを通して OS 側の実装へ転送される。

use core::ffi::{c_int, CStr};

use crate::error::{Errno, Result};
use crate::types::{OffT, Pid, Stat};

pub mod power;
pub mod thread;
pub mod timer;

#[cfg(target_arch = "x86_64")]
pub mod serial;

#[cfg(test)]
pub mod fake;

pub use power::QemuExit;
pub use thread::ActiveThread;
pub use timer::TickClock;

#[cfg(target_arch = "x86_64")]
pub use serial::SerialConsole;

/// スケジューラ
pub trait Scheduler: Sync {
    /// 実行中スレッドのID
    fn active_pid(&self) -> Pid;
}

/// バイトストリームのコンソール（UART など）
pub trait Console: Sync {
    /// デバイスを初期化（newlib の `_init` から呼ばれる）
    fn init(&self) {}

    /// 1バイト以上届くまでブロックして読み込む
    ///
    /// # 戻り値
    /// 読み込んだバイト数
    fn read(&self, buf: &mut [u8]) -> usize;

    /// 送信が完了するまでブロックして書き込む
    ///
    /// # 戻り値
    /// 書き込んだバイト数
    fn write(&self, buf: &[u8]) -> usize;
}

/// 電源管理
pub trait PowerOff: Sync {
    /// デバイスの電源を切る
    ///
    /// 実装によっては戻ってくることがある。呼び出し側は戻った後に停止する。
    fn off(&self);
}

/// 単調増加するマイクロ秒クロック
pub trait MonotonicClock: Sync {
    /// 起動からの経過時間（マイクロ秒）
    fn now_usec(&self) -> u64;
}

/// シグナル配送
pub trait Signals: Sync {
    /// `pid` へシグナル `sig` を送る
    fn kill(&self, pid: Pid, sig: c_int) -> Result<()>;
}

/// シグナル未対応の既定実装
///
/// 常に ESRCH で失敗する
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignals;

impl Signals for NoSignals {
    fn kill(&self, _pid: Pid, _sig: c_int) -> Result<()> {
        Err(Errno::ESRCH)
    }
}

/// 仮想ファイルシステム
///
/// 戻り値の形式は VFS 側のまま: 0 以上が成功、負の値が `-errno`。
pub trait Vfs: Sync {
    /// ファイルを開く
    fn open(&self, path: &CStr, flags: c_int, mode: c_int) -> c_int;
    /// 読み込み
    fn read(&self, fd: c_int, buf: &mut [u8]) -> isize;
    /// 書き込み
    fn write(&self, fd: c_int, buf: &[u8]) -> isize;
    /// ファイルを閉じる
    fn close(&self, fd: c_int) -> c_int;
    /// ディスクリプタの操作
    fn fcntl(&self, fd: c_int, cmd: c_int, arg: c_int) -> c_int;
    /// 読み書き位置の変更
    fn lseek(&self, fd: c_int, off: OffT, whence: c_int) -> OffT;
    /// ディスクリプタからファイル情報を取得
    fn fstat(&self, fd: c_int, st: &mut Stat) -> c_int;
    /// パスからファイル情報を取得
    fn stat(&self, path: &CStr, st: &mut Stat) -> c_int;
    /// ファイルを削除
    fn unlink(&self, path: &CStr) -> c_int;
}
