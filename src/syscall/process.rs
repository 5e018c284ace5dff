//! プロセス管理関連のシステムコール

use core::ffi::c_int;

use super::Syscalls;
use crate::error::Result;
use crate::types::Pid;
use crate::util::irq;
use crate::util::log::{log_to, LogLevel};

impl Syscalls<'_> {
    /// GetPidシステムコール
    ///
    /// 実行中スレッドのIDをプロセスIDとして返す。失敗しない
    pub fn getpid(&self) -> Pid {
        self.scheduler.active_pid()
    }

    /// Exitシステムコール
    ///
    /// 開いているファイルやバッファは片付けずに電源を切る
    ///
    /// # 引数
    /// - `code`: 終了コード
    ///
    /// # 戻り値
    /// このシステムコールは戻らない
    pub fn exit(&self, code: c_int) -> ! {
        log_to(
            self.console,
            LogLevel::Info,
            format_args!("#! exit {}: powering off", code),
        );
        self.power.off();
        irq::halt()
    }

    /// Killシステムコール
    ///
    /// 登録されたシグナル実装へ転送する
    pub fn kill(&self, pid: Pid, sig: c_int) -> Result<()> {
        self.signals.kill(pid, sig)
    }

    /// Sbrkシステムコール
    ///
    /// # 戻り値
    /// 移動前のヒープ末端。領域外へ出る場合は ENOMEM
    pub fn sbrk(&self, incr: isize) -> Result<*mut u8> {
        self.heap.sbrk(incr)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::error::Errno;
    use crate::mem::{BumpHeap, HeapRegion};
    use crate::service::fake::{FakeClock, FakeConsole, FakePower, FakeScheduler, FakeVfs};
    use crate::service::{NoSignals, Signals};
    use crate::syscall::Services;

    struct Env {
        scheduler: FakeScheduler,
        console: FakeConsole,
        power: FakePower,
        heap: BumpHeap,
        vfs: FakeVfs,
        clock: FakeClock,
    }

    impl Env {
        fn new() -> Self {
            Self {
                scheduler: FakeScheduler(7),
                console: FakeConsole::new(b""),
                power: FakePower::new(),
                heap: BumpHeap::new(HeapRegion::new(0x1000, 0x2000).unwrap()),
                vfs: FakeVfs::new(0),
                clock: FakeClock::new(0),
            }
        }

        fn syscalls<'a>(&'a self, signals: &'a dyn Signals) -> Syscalls<'a> {
            Syscalls::new(Services {
                scheduler: &self.scheduler,
                console: &self.console,
                power: &self.power,
                signals,
                heap: &self.heap,
                #[cfg(feature = "vfs")]
                vfs: &self.vfs,
                #[cfg(feature = "timer")]
                clock: &self.clock,
            })
        }
    }

    struct Deliver;

    impl Signals for Deliver {
        fn kill(&self, pid: Pid, _sig: c_int) -> Result<()> {
            if pid == 7 {
                Ok(())
            } else {
                Err(Errno::EPERM)
            }
        }
    }

    #[test]
    fn test_getpid_is_active_thread() {
        let env = Env::new();
        let sys = env.syscalls(&NoSignals);
        assert_eq!(sys.getpid(), 7);
    }

    #[test]
    fn test_kill_default_is_esrch() {
        let env = Env::new();
        let sys = env.syscalls(&NoSignals);
        assert_eq!(sys.kill(7, 15), Err(Errno::ESRCH));
        assert_eq!(sys.kill(0, 0), Err(Errno::ESRCH));
    }

    #[test]
    fn test_kill_uses_injected_handler() {
        let env = Env::new();
        let sys = env.syscalls(&Deliver);
        assert_eq!(sys.kill(7, 15), Ok(()));
        assert_eq!(sys.kill(8, 15), Err(Errno::EPERM));
    }

    #[test]
    fn test_sbrk_forwards_to_heap() {
        let env = Env::new();
        let sys = env.syscalls(&NoSignals);
        assert_eq!(sys.sbrk(0x100).unwrap() as usize, 0x1000);
        assert_eq!(sys.heap().cursor(), 0x1100);
        assert_eq!(sys.sbrk(0x1000), Err(Errno::ENOMEM));
    }

    #[test]
    fn test_exit_logs_and_powers_off() {
        let env = Env::new();
        let sys = env.syscalls(&NoSignals);
        let res = panic::catch_unwind(AssertUnwindSafe(|| sys.exit(3)));
        assert!(res.is_err());
        assert_eq!(env.power.calls(), 1);
        assert_eq!(env.console.output(), b"[INFO]  #! exit 3: powering off\n");
    }
}
