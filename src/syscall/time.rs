//! 時間関連システムコール

use super::Syscalls;
use crate::error::{Errno, Result};
use crate::service::MonotonicClock;
use crate::types::TimeVal;

/// 時刻の取得
pub trait TimeOfDay {
    /// 起動からの経過時間を `timeval` で返す
    fn gettimeofday(&self) -> Result<TimeVal>;
}

/// 単調クロックを使う実装
pub struct ClockTime<'a> {
    clock: &'a dyn MonotonicClock,
}

impl<'a> ClockTime<'a> {
    pub fn new(clock: &'a dyn MonotonicClock) -> Self {
        Self { clock }
    }
}

impl TimeOfDay for ClockTime<'_> {
    fn gettimeofday(&self) -> Result<TimeVal> {
        Ok(TimeVal::from_micros(self.clock.now_usec()))
    }
}

/// タイマーのない構成の実装（常に ENOSYS）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClock;

impl TimeOfDay for NoClock {
    fn gettimeofday(&self) -> Result<TimeVal> {
        Err(Errno::ENOSYS)
    }
}

impl Syscalls<'_> {
    /// Gettimeofdayシステムコール
    ///
    /// タイムゾーンは扱わない
    pub fn gettimeofday(&self) -> Result<TimeVal> {
        self.time.gettimeofday()
    }
}
