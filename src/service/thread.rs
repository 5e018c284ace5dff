//! 実行中スレッドの参照

use core::sync::atomic::{AtomicI32, Ordering};

use super::Scheduler;
use crate::types::Pid;

/// カーネルスレッドが存在しないときのID
pub const KERNEL_PID_UNDEF: Pid = 0;

/// 実行中スレッドIDを保持するセル
///
/// スケジューラがコンテキストスイッチのたびに `switch_to` で更新する。
#[derive(Debug)]
pub struct ActiveThread {
    pid: AtomicI32,
}

impl ActiveThread {
    /// スレッド未実行の状態で作成
    pub const fn new() -> Self {
        Self {
            pid: AtomicI32::new(KERNEL_PID_UNDEF),
        }
    }

    /// 実行中スレッドを切り替える
    pub fn switch_to(&self, pid: Pid) {
        self.pid.store(pid, Ordering::Release);
    }
}

impl Default for ActiveThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ActiveThread {
    fn active_pid(&self) -> Pid {
        self.pid.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_to() {
        let active = ActiveThread::new();
        assert_eq!(active.active_pid(), KERNEL_PID_UNDEF);
        active.switch_to(4);
        assert_eq!(active.active_pid(), 4);
    }
}
