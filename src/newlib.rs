//! Newlib サポート用のシステムコールグルーコード
//!
//! newlib の `_xxx_r` フックをインストール済みの `Syscalls` へ転送する。
//! 失敗時は `struct _reent` の errno を設定して -1 を返す。
//! `export-symbols` feature を有効にすると `#[no_mangle]` で公開される。
//!
//! 登録前に呼ばれた場合は ENOSYS で失敗する（`_getpid` は 0、`_exit` は停止）。

use core::ffi::{c_char, c_int, c_void, CStr};

use crate::error::{Errno, Result};
use crate::reent::{self, Reent};
use crate::syscall::{installed, Syscalls};
use crate::types::{is_std_stream, OffT, Pid, Stat, TimeVal};
use crate::util::irq;

/// `_sbrk_r` の失敗値 `(void *)-1`
const SBRK_FAILED: *mut c_void = usize::MAX as *mut c_void;

/// 結果を errno 付きの C の戻り値へ変換
///
/// `r` が NULL の場合はグローバルなエラーコンテキストへ書き込む
fn complete<T>(r: *mut Reent, result: Result<T>, failure: T) -> T {
    match unsafe { r.as_mut() } {
        Some(reent) => reent.complete(result, failure),
        None => reent::with_global(|reent| reent.complete(result, failure)),
    }
}

/// インストール済みのシステムコール層で処理する
fn with_sys<T>(f: impl FnOnce(&'static Syscalls<'static>) -> Result<T>) -> Result<T> {
    match installed() {
        Some(sys) => f(sys),
        None => Err(Errno::ENOSYS),
    }
}

/// C 文字列を借用する
unsafe fn path<'a>(name: *const c_char) -> Result<&'a CStr> {
    if name.is_null() {
        Err(Errno::EFAULT)
    } else {
        Ok(CStr::from_ptr(name))
    }
}

/// 読み込み先バッファをスライスにする
unsafe fn buf_mut<'a>(ptr: *mut c_void, count: usize) -> Result<&'a mut [u8]> {
    if count == 0 {
        Ok(&mut [])
    } else if count > isize::MAX as usize {
        Err(Errno::EINVAL)
    } else if ptr.is_null() {
        Err(Errno::EFAULT)
    } else {
        Ok(core::slice::from_raw_parts_mut(ptr as *mut u8, count))
    }
}

/// 書き込み元バッファをスライスにする
unsafe fn buf<'a>(ptr: *const c_void, count: usize) -> Result<&'a [u8]> {
    if count == 0 {
        Ok(&[])
    } else if count > isize::MAX as usize {
        Err(Errno::EINVAL)
    } else if ptr.is_null() {
        Err(Errno::EFAULT)
    } else {
        Ok(core::slice::from_raw_parts(ptr as *const u8, count))
    }
}

/// 出力先の構造体を借用する
unsafe fn out<'a, T>(ptr: *mut T) -> Result<&'a mut T> {
    ptr.as_mut().ok_or(Errno::EFAULT)
}

/// `__libc_init_array()` から呼ばれる初期化処理
///
/// コンソールを初期化する
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub extern "C" fn _init() {
    if let Some(sys) = installed() {
        sys.init();
    }
}

/// newlib の終了処理（何もしない）
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub extern "C" fn _fini() {}

/// ファイルを片付けずにプログラムを終了する
///
/// # 引数
/// - `n`: 終了コード（0 が正常終了）
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub extern "C" fn _exit(n: c_int) -> ! {
    match installed() {
        Some(sys) => sys.exit(n),
        None => irq::halt(),
    }
}

/// ヒープからメモリを確保する
///
/// 確保のみで、解放の手段はない
///
/// # 戻り値
/// 成功時は確保した領域の先頭、失敗時は `(void *)-1`（errno = ENOMEM）
///
/// # Safety
/// `r` は NULL か有効な `struct _reent` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _sbrk_r(r: *mut Reent, incr: isize) -> *mut c_void {
    let res = with_sys(|sys| sys.sbrk(incr).map(|p| p as *mut c_void));
    complete(r, res, SBRK_FAILED)
}

/// 実行中スレッドのプロセスIDを取得
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub extern "C" fn _getpid() -> Pid {
    installed().map_or(0, |sys| sys.getpid())
}

/// 実行中スレッドのプロセスIDを取得（リエントラント版）
///
/// # Safety
/// `r` は使わない
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _getpid_r(_r: *mut Reent) -> Pid {
    _getpid()
}

/// スレッドにシグナルを送る
///
/// 既定では常に ESRCH で失敗する
///
/// # Safety
/// `r` は NULL か有効な `struct _reent` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _kill_r(r: *mut Reent, pid: Pid, sig: c_int) -> c_int {
    let res = with_sys(|sys| sys.kill(pid, sig).map(|()| 0));
    complete(r, res, -1)
}

/// スレッドにシグナルを送る（非リエントラント版）
///
/// エラー値はグローバルなエラーコンテキストへ書き込む
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub extern "C" fn _kill(pid: Pid, sig: c_int) -> c_int {
    let res = with_sys(|sys| sys.kill(pid, sig).map(|()| 0));
    reent::with_global(|reent| reent.ret_int(res))
}

/// ファイルを開く
///
/// # 戻り値
/// 成功時はファイルディスクリプタ (>= 0)、失敗時は -1
///
/// # Safety
/// `name` は NUL 終端された文字列を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _open_r(
    r: *mut Reent,
    name: *const c_char,
    flags: c_int,
    mode: c_int,
) -> c_int {
    let res = with_sys(|sys| sys.open(path(name)?, flags, mode));
    complete(r, res, -1)
}

/// 開いているファイルから読み込む
///
/// # 戻り値
/// 成功時は読み込んだバイト数、失敗時は -1
///
/// # Safety
/// `dest` は `count` バイト書き込めること
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _read_r(
    r: *mut Reent,
    fd: c_int,
    dest: *mut c_void,
    count: usize,
) -> isize {
    let res = with_sys(|sys| sys.read(fd, buf_mut(dest, count)?));
    complete(r, res.map(|n| n as isize), -1)
}

/// 開いているファイルへ書き込む
///
/// # 戻り値
/// 成功時は書き込んだバイト数、失敗時は -1
///
/// # Safety
/// `src` は `count` バイト読めること
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _write_r(
    r: *mut Reent,
    fd: c_int,
    src: *const c_void,
    count: usize,
) -> isize {
    let res = with_sys(|sys| sys.write(fd, buf(src, count)?));
    complete(r, res.map(|n| n as isize), -1)
}

/// ファイルを閉じる
///
/// 失敗した場合も `fd` は無効になる。close を再試行しないこと
///
/// # Safety
/// `r` は NULL か有効な `struct _reent` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _close_r(r: *mut Reent, fd: c_int) -> c_int {
    complete(r, with_sys(|sys| sys.close(fd)), -1)
}

/// ファイルのオプションを参照・設定する
///
/// # Safety
/// `r` は NULL か有効な `struct _reent` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _fcntl_r(r: *mut Reent, fd: c_int, cmd: c_int, arg: c_int) -> c_int {
    complete(r, with_sys(|sys| sys.fcntl(fd, cmd, arg)), -1)
}

/// ファイルの読み書き位置を変更する
///
/// `whence` は SEEK_SET / SEEK_CUR / SEEK_END
///
/// # 戻り値
/// 成功時は新しい位置、失敗時は -1
///
/// # Safety
/// `r` は NULL か有効な `struct _reent` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _lseek_r(r: *mut Reent, fd: c_int, off: OffT, whence: c_int) -> OffT {
    complete(r, with_sys(|sys| sys.lseek(fd, off, whence)), -1)
}

/// 開いているファイルの情報を取得
///
/// # Safety
/// `st` は書き込み可能な `struct stat` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _fstat_r(r: *mut Reent, fd: c_int, st: *mut Stat) -> c_int {
    let res = with_sys(|sys| sys.fstat(fd, out(st)?).map(|()| 0));
    complete(r, res, -1)
}

/// パスで指定したファイルの情報を取得
///
/// # Safety
/// `name` は NUL 終端された文字列、`st` は書き込み可能な `struct stat` を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _stat_r(r: *mut Reent, name: *const c_char, st: *mut Stat) -> c_int {
    let res = with_sys(|sys| sys.stat(path(name)?, out(st)?).map(|()| 0));
    complete(r, res, -1)
}

/// ファイルを削除する
///
/// # Safety
/// `name` は NUL 終端された文字列を指すこと
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _unlink_r(r: *mut Reent, name: *const c_char) -> c_int {
    let res = with_sys(|sys| sys.unlink(path(name)?).map(|()| 0));
    complete(r, res, -1)
}

/// 端末かどうかを返す
///
/// 標準入出力(0,1,2)のみ 1。errno には触れない
///
/// # Safety
/// `r` は使わない
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _isatty_r(_r: *mut Reent, fd: c_int) -> c_int {
    c_int::from(is_std_stream(fd))
}

/// 起動からの経過時刻を取得
///
/// タイマーのない構成では ENOSYS で失敗し、`tp` には書き込まない
///
/// # Safety
/// `tp` は書き込み可能な `struct timeval` を指すこと。`tzp` は使わない
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn _gettimeofday_r(
    r: *mut Reent,
    tp: *mut TimeVal,
    _tzp: *mut c_void,
) -> c_int {
    let res = with_sys(|sys| {
        let now = sys.gettimeofday()?;
        *out(tp)? = now;
        Ok(0)
    });
    complete(r, res, -1)
}
