//! C ランタイムと共有する型と定数
//!
//! レイアウトは newlib の既定（`sys/stat.h`, `sys/_timeval.h`）に合わせる。

use core::ffi::{c_int, c_long, c_short, c_uint, c_ushort};

/// プロセスID（newlib の `pid_t`）
pub type Pid = c_int;

/// ファイルオフセット（newlib の `_off_t`）
pub type OffT = c_long;

/// 標準入力のファイルディスクリプタ
pub const STDIN_FILENO: c_int = 0;
/// 標準出力のファイルディスクリプタ
pub const STDOUT_FILENO: c_int = 1;
/// 標準エラー出力のファイルディスクリプタ
pub const STDERR_FILENO: c_int = 2;

/// ファイル先頭からのシーク
pub const SEEK_SET: c_int = 0;
/// 現在位置からのシーク
pub const SEEK_CUR: c_int = 1;
/// ファイル末尾からのシーク
pub const SEEK_END: c_int = 2;

/// 1秒あたりのマイクロ秒数
pub const US_PER_SEC: u64 = 1_000_000;

/// `struct timespec`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeSpec {
    /// 秒
    pub tv_sec: i64,
    /// ナノ秒
    pub tv_nsec: c_long,
}

/// `struct timeval`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeVal {
    /// 秒
    pub tv_sec: i64,
    /// マイクロ秒
    pub tv_usec: c_long,
}

impl TimeVal {
    /// マイクロ秒単位の時刻から変換
    pub fn from_micros(us: u64) -> Self {
        let sec = us / US_PER_SEC;
        Self {
            tv_sec: sec as i64,
            tv_usec: (us - sec * US_PER_SEC) as c_long,
        }
    }
}

/// `struct stat`
///
/// 中身は VFS が埋める。このレイヤーでは読み書きしない。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub st_dev: c_short,
    pub st_ino: c_ushort,
    pub st_mode: c_uint,
    pub st_nlink: c_ushort,
    pub st_uid: c_ushort,
    pub st_gid: c_ushort,
    pub st_rdev: c_short,
    pub st_size: OffT,
    pub st_atim: TimeSpec,
    pub st_mtim: TimeSpec,
    pub st_ctim: TimeSpec,
    pub st_blksize: c_long,
    pub st_blocks: c_long,
    pub st_spare4: [c_long; 2],
}

/// 標準ストリーム（stdin/stdout/stderr）のディスクリプタかどうか
pub fn is_std_stream(fd: c_int) -> bool {
    matches!(fd, STDIN_FILENO | STDOUT_FILENO | STDERR_FILENO)
}
