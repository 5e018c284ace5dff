//! ティックベースの単調クロック
//!
//! タイマー割込みハンドラが `tick` を呼び、経過ティック数から
//! マイクロ秒を計算する。

use core::sync::atomic::{AtomicU64, Ordering};

use super::MonotonicClock;

/// 既定のティック周期（10ms = 100Hz の PIT）
pub const DEFAULT_TICK_USEC: u64 = 10_000;

/// タイマー割込みカウンタによるクロック
#[derive(Debug)]
pub struct TickClock {
    ticks: AtomicU64,
    usec_per_tick: u64,
}

impl TickClock {
    /// ティック周期（マイクロ秒）を指定して作成
    pub const fn new(usec_per_tick: u64) -> Self {
        Self {
            ticks: AtomicU64::new(0),
            usec_per_tick,
        }
    }

    /// タイマー割込みから呼ぶ
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// 現在のタイマーティック数を取得
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_USEC)
    }
}

impl MonotonicClock for TickClock {
    fn now_usec(&self) -> u64 {
        self.ticks().saturating_mul(self.usec_per_tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_to_usec() {
        let clock = TickClock::default();
        assert_eq!(clock.now_usec(), 0);
        for _ in 0..150 {
            clock.tick();
        }
        assert_eq!(clock.ticks(), 150);
        assert_eq!(clock.now_usec(), 1_500_000);
    }
}
