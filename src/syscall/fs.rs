//! ファイルシステム関連のシステムコール
//!
//! ファイル操作は `FileOps` として抽象化し、VFS へ転送する `VfsFiles` と
//! コンソールだけを扱う `ConsoleFiles` の2つの実装を持つ。

use core::ffi::{c_int, CStr};

use super::Syscalls;
use crate::error::{check, check_size, errno_from_ret, Errno, Result};
use crate::service::{Console, Vfs};
use crate::types::{is_std_stream, OffT, Stat};

/// ファイルディスクリプタ操作
pub trait FileOps {
    /// ファイルを開く
    ///
    /// # 戻り値
    /// ファイルディスクリプタ
    fn open(&self, path: &CStr, flags: c_int, mode: c_int) -> Result<c_int>;

    /// 読み込み
    ///
    /// # 戻り値
    /// 読み込んだバイト数
    fn read(&self, fd: c_int, buf: &mut [u8]) -> Result<usize>;

    /// 書き込み
    ///
    /// # 戻り値
    /// 書き込んだバイト数
    fn write(&self, fd: c_int, buf: &[u8]) -> Result<usize>;

    /// ファイルを閉じる
    ///
    /// 失敗した場合も `fd` は無効になったものとして扱い、再度 close しないこと
    fn close(&self, fd: c_int) -> Result<c_int>;

    /// ディスクリプタの操作
    fn fcntl(&self, fd: c_int, cmd: c_int, arg: c_int) -> Result<c_int>;

    /// 読み書き位置の変更
    ///
    /// # 引数
    /// - `whence`: 基準位置 (SEEK_SET, SEEK_CUR, SEEK_END)
    ///
    /// # 戻り値
    /// 新しいファイル位置
    fn lseek(&self, fd: c_int, off: OffT, whence: c_int) -> Result<OffT>;

    /// ディスクリプタからファイル情報を取得
    fn fstat(&self, fd: c_int, st: &mut Stat) -> Result<()>;

    /// パスからファイル情報を取得
    fn stat(&self, path: &CStr, st: &mut Stat) -> Result<()>;

    /// ファイルを削除
    fn unlink(&self, path: &CStr) -> Result<()>;
}

/// VFS へ転送するファイル操作
///
/// 引数はそのまま渡し、負の戻り値を errno に変換するだけ。
/// リトライやバッファリングはしない。
pub struct VfsFiles<'a> {
    vfs: &'a dyn Vfs,
}

impl<'a> VfsFiles<'a> {
    pub fn new(vfs: &'a dyn Vfs) -> Self {
        Self { vfs }
    }
}

impl FileOps for VfsFiles<'_> {
    fn open(&self, path: &CStr, flags: c_int, mode: c_int) -> Result<c_int> {
        check(self.vfs.open(path, flags, mode))
    }

    fn read(&self, fd: c_int, buf: &mut [u8]) -> Result<usize> {
        check_size(self.vfs.read(fd, buf))
    }

    fn write(&self, fd: c_int, buf: &[u8]) -> Result<usize> {
        check_size(self.vfs.write(fd, buf))
    }

    fn close(&self, fd: c_int) -> Result<c_int> {
        check(self.vfs.close(fd))
    }

    fn fcntl(&self, fd: c_int, cmd: c_int, arg: c_int) -> Result<c_int> {
        check(self.vfs.fcntl(fd, cmd, arg))
    }

    fn lseek(&self, fd: c_int, off: OffT, whence: c_int) -> Result<OffT> {
        let ret = self.vfs.lseek(fd, off, whence);
        if ret < 0 {
            Err(errno_from_ret(i64::from(ret)))
        } else {
            Ok(ret)
        }
    }

    fn fstat(&self, fd: c_int, st: &mut Stat) -> Result<()> {
        check(self.vfs.fstat(fd, st)).map(|_| ())
    }

    fn stat(&self, path: &CStr, st: &mut Stat) -> Result<()> {
        check(self.vfs.stat(path, st)).map(|_| ())
    }

    fn unlink(&self, path: &CStr) -> Result<()> {
        check(self.vfs.unlink(path)).map(|_| ())
    }
}

/// VFS なしの構成で使うコンソール専用のファイル操作
///
/// read/write はディスクリプタに関係なくコンソールへ転送する。
/// それ以外は常に ENODEV。
pub struct ConsoleFiles<'a> {
    console: &'a dyn Console,
}

impl<'a> ConsoleFiles<'a> {
    pub fn new(console: &'a dyn Console) -> Self {
        Self { console }
    }
}

impl FileOps for ConsoleFiles<'_> {
    fn open(&self, _path: &CStr, _flags: c_int, _mode: c_int) -> Result<c_int> {
        Err(Errno::ENODEV)
    }

    fn read(&self, _fd: c_int, buf: &mut [u8]) -> Result<usize> {
        Ok(self.console.read(buf))
    }

    fn write(&self, _fd: c_int, buf: &[u8]) -> Result<usize> {
        Ok(self.console.write(buf))
    }

    fn close(&self, _fd: c_int) -> Result<c_int> {
        Err(Errno::ENODEV)
    }

    fn fcntl(&self, _fd: c_int, _cmd: c_int, _arg: c_int) -> Result<c_int> {
        Err(Errno::ENODEV)
    }

    fn lseek(&self, _fd: c_int, _off: OffT, _whence: c_int) -> Result<OffT> {
        Err(Errno::ENODEV)
    }

    fn fstat(&self, _fd: c_int, _st: &mut Stat) -> Result<()> {
        Err(Errno::ENODEV)
    }

    fn stat(&self, _path: &CStr, _st: &mut Stat) -> Result<()> {
        Err(Errno::ENODEV)
    }

    fn unlink(&self, _path: &CStr) -> Result<()> {
        Err(Errno::ENODEV)
    }
}

impl Syscalls<'_> {
    /// Openシステムコール
    pub fn open(&self, path: &CStr, flags: c_int, mode: c_int) -> Result<c_int> {
        self.files.open(path, flags, mode)
    }

    /// Readシステムコール
    pub fn read(&self, fd: c_int, buf: &mut [u8]) -> Result<usize> {
        self.files.read(fd, buf)
    }

    /// Writeシステムコール
    pub fn write(&self, fd: c_int, buf: &[u8]) -> Result<usize> {
        self.files.write(fd, buf)
    }

    /// Closeシステムコール
    pub fn close(&self, fd: c_int) -> Result<c_int> {
        self.files.close(fd)
    }

    /// Fcntlシステムコール
    pub fn fcntl(&self, fd: c_int, cmd: c_int, arg: c_int) -> Result<c_int> {
        self.files.fcntl(fd, cmd, arg)
    }

    /// Lseekシステムコール
    pub fn lseek(&self, fd: c_int, off: OffT, whence: c_int) -> Result<OffT> {
        self.files.lseek(fd, off, whence)
    }

    /// Fstatシステムコール
    pub fn fstat(&self, fd: c_int, st: &mut Stat) -> Result<()> {
        self.files.fstat(fd, st)
    }

    /// Statシステムコール
    pub fn stat(&self, path: &CStr, st: &mut Stat) -> Result<()> {
        self.files.stat(path, st)
    }

    /// Unlinkシステムコール
    pub fn unlink(&self, path: &CStr) -> Result<()> {
        self.files.unlink(path)
    }

    /// Isattyシステムコール
    ///
    /// 標準入出力(0,1,2)だけを端末とみなす。失敗しない
    pub fn isatty(&self, fd: c_int) -> bool {
        is_std_stream(fd)
    }
}
