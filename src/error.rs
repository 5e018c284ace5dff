//! エラー型定義
//!
//! すべてのシステムコールエラーを POSIX の errno 値として Result で表現する。
//! 番号は newlib の `sys/errno.h` に合わせる。

use core::fmt;

/// errno 値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(i32);

impl Errno {
    /// 操作が許可されていない
    pub const EPERM: Errno = Errno(1);
    /// ファイルやディレクトリが存在しない
    pub const ENOENT: Errno = Errno(2);
    /// プロセスが存在しない
    pub const ESRCH: Errno = Errno(3);
    /// 割込まれたシステムコール
    pub const EINTR: Errno = Errno(4);
    /// I/O エラー
    pub const EIO: Errno = Errno(5);
    /// 不正なファイルディスクリプタ
    pub const EBADF: Errno = Errno(9);
    /// 一時的に利用不可
    pub const EAGAIN: Errno = Errno(11);
    /// メモリ不足
    pub const ENOMEM: Errno = Errno(12);
    /// 権限不足
    pub const EACCES: Errno = Errno(13);
    /// 不正なアドレス
    pub const EFAULT: Errno = Errno(14);
    /// リソースが使用中
    pub const EBUSY: Errno = Errno(16);
    /// ファイルが既に存在する
    pub const EEXIST: Errno = Errno(17);
    /// デバイスが存在しない
    pub const ENODEV: Errno = Errno(19);
    /// ディレクトリではない
    pub const ENOTDIR: Errno = Errno(20);
    /// ディレクトリである
    pub const EISDIR: Errno = Errno(21);
    /// 無効な引数
    pub const EINVAL: Errno = Errno(22);
    /// オープン中のファイルが多すぎる
    pub const EMFILE: Errno = Errno(24);
    /// デバイスに空き領域がない
    pub const ENOSPC: Errno = Errno(28);
    /// シークできない
    pub const ESPIPE: Errno = Errno(29);
    /// 読み取り専用のファイルシステム
    pub const EROFS: Errno = Errno(30);
    /// 未実装の機能
    pub const ENOSYS: Errno = Errno(88);

    /// errno 値からエラーを作成
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// 負のエラーコード（VFS の戻り値形式）からエラーを作成
    ///
    /// # 引数
    /// - `ret`: 負の戻り値
    ///
    /// # 戻り値
    /// `-ret` を errno とするエラー
    pub const fn from_negative(ret: i32) -> Self {
        Self(ret.wrapping_neg())
    }

    /// errno の数値を取得
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// 既知のエラー名を取得
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Errno::EPERM => "EPERM",
            Errno::ENOENT => "ENOENT",
            Errno::ESRCH => "ESRCH",
            Errno::EINTR => "EINTR",
            Errno::EIO => "EIO",
            Errno::EBADF => "EBADF",
            Errno::EAGAIN => "EAGAIN",
            Errno::ENOMEM => "ENOMEM",
            Errno::EACCES => "EACCES",
            Errno::EFAULT => "EFAULT",
            Errno::EBUSY => "EBUSY",
            Errno::EEXIST => "EEXIST",
            Errno::ENODEV => "ENODEV",
            Errno::ENOTDIR => "ENOTDIR",
            Errno::EISDIR => "EISDIR",
            Errno::EINVAL => "EINVAL",
            Errno::EMFILE => "EMFILE",
            Errno::ENOSPC => "ENOSPC",
            Errno::ESPIPE => "ESPIPE",
            Errno::EROFS => "EROFS",
            Errno::ENOSYS => "ENOSYS",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Errno {
    /// エラーをフォーマット表示
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "errno {}", self.0),
        }
    }
}

/// 結果型のエイリアス
pub type Result<T> = core::result::Result<T, Errno>;

/// 負の戻り値から errno を取り出す
///
/// errno として表せない値は EIO とする
pub fn errno_from_ret(ret: i64) -> Errno {
    match ret.checked_neg().map(i32::try_from) {
        Some(Ok(code)) if code > 0 => Errno::new(code),
        _ => {
            crate::error!("out-of-range error code {} treated as EIO", ret);
            Errno::EIO
        }
    }
}

/// 負の戻り値をエラーとして扱う VFS 形式の結果を変換
///
/// # 引数
/// - `ret`: 0 以上なら成功値、負ならエラーコード
pub fn check(ret: i32) -> Result<i32> {
    if ret < 0 {
        Err(errno_from_ret(i64::from(ret)))
    } else {
        Ok(ret)
    }
}

/// `check` の `isize` 版（read/write のバイト数用）
pub fn check_size(ret: isize) -> Result<usize> {
    if ret < 0 {
        Err(errno_from_ret(ret as i64))
    } else {
        Ok(ret as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_negative() {
        assert_eq!(Errno::from_negative(-2), Errno::ENOENT);
        assert_eq!(Errno::from_negative(-19).code(), 19);
    }

    #[test]
    fn test_check() {
        assert_eq!(check(0), Ok(0));
        assert_eq!(check(7), Ok(7));
        assert_eq!(check(-9), Err(Errno::EBADF));
        assert_eq!(check_size(-5), Err(Errno::EIO));
        assert_eq!(check_size(128), Ok(128));
    }

    #[test]
    fn test_unrepresentable_code_is_eio() {
        #[cfg(target_pointer_width = "64")]
        assert_eq!(check_size(-(1isize << 32)), Err(Errno::EIO));
        assert_eq!(check_size(isize::MIN), Err(Errno::EIO));
        assert_eq!(check(i32::MIN), Err(Errno::EIO));
        assert_eq!(errno_from_ret(-(1i64 << 40)), Errno::EIO);
        assert_eq!(errno_from_ret(-28), Errno::ENOSPC);
    }

    #[test]
    fn test_display() {
        assert_eq!(Errno::ENOSYS.to_string(), "ENOSYS (88)");
        assert_eq!(Errno::new(200).to_string(), "errno 200");
    }
}
