//! ロギングユーティリティ
//!
//! 出力先はインストール済みのシステムコール層が持つコンソール。
//! インストール前のログは捨てる。

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU8, Ordering};

use crate::service::Console;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// 現在のログレベル（デフォルト: Info）
static LOG_LEVEL: AtomicU8 = AtomicU8::new(2);

fn level_to_u8(level: LogLevel) -> u8 {
    match level {
        LogLevel::Trace => 0,
        LogLevel::Debug => 1,
        LogLevel::Info => 2,
        LogLevel::Warn => 3,
        LogLevel::Error => 4,
    }
}

fn should_log(level: LogLevel) -> bool {
    level_to_u8(level) >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// ログレベルを設定
pub fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level_to_u8(level), Ordering::Relaxed);
}

fn prefix(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "[TRACE]",
        LogLevel::Debug => "[DEBUG]",
        LogLevel::Info => "[INFO] ",
        LogLevel::Warn => "[WARN] ",
        LogLevel::Error => "[ERROR]",
    }
}

/// コンソールへの `fmt::Write` アダプタ
pub struct ConsoleWriter<'a>(pub &'a dyn Console);

impl Write for ConsoleWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut rest = s.as_bytes();
        while !rest.is_empty() {
            let n = self.0.write(rest);
            if n == 0 {
                return Err(fmt::Error);
            }
            rest = &rest[n.min(rest.len())..];
        }
        Ok(())
    }
}

/// 1行分のログを指定のコンソールへ書き出す
pub fn log_to(console: &dyn Console, level: LogLevel, args: fmt::Arguments) {
    if !should_log(level) {
        return;
    }
    let mut out = ConsoleWriter(console);
    let _ = writeln!(out, "{} {}", prefix(level), args);
}

/// ログ出力
pub fn log(level: LogLevel, args: fmt::Arguments) {
    if let Some(sys) = crate::syscall::installed() {
        log_to(sys.console(), level, args);
    }
}

/// トレースログ
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::util::log::log($crate::util::log::LogLevel::Trace, format_args!($($arg)*))
    };
}

/// デバッグログ
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::util::log::log($crate::util::log::LogLevel::Debug, format_args!($($arg)*))
    };
}

/// 情報ログ
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::util::log::log($crate::util::log::LogLevel::Info, format_args!($($arg)*))
    };
}

/// 警告ログ
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::util::log::log($crate::util::log::LogLevel::Warn, format_args!($($arg)*))
    };
}

/// エラーログ
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::util::log::log($crate::util::log::LogLevel::Error, format_args!($($arg)*))
    };
}
