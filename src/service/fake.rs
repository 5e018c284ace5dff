//! テスト用のサービス実装

use std::collections::VecDeque;
use std::ffi::CStr;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use core::ffi::c_int;

use super::{Console, MonotonicClock, PowerOff, Scheduler, Vfs};
use crate::types::{OffT, Pid, Stat};

/// 入力をあらかじめ積み、出力を記録するコンソール
pub struct FakeConsole {
    input: Mutex<VecDeque<u8>>,
    output: Mutex<Vec<u8>>,
    inits: AtomicUsize,
}

impl FakeConsole {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: Mutex::new(input.iter().copied().collect()),
            output: Mutex::new(Vec::new()),
            inits: AtomicUsize::new(0),
        }
    }

    pub fn output(&self) -> Vec<u8> {
        self.output.lock().unwrap().clone()
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

impl Console for FakeConsole {
    fn init(&self) {
        self.inits.fetch_add(1, Ordering::SeqCst);
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        let mut input = self.input.lock().unwrap();
        let mut n = 0;
        while n < buf.len() {
            match input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn write(&self, buf: &[u8]) -> usize {
        self.output.lock().unwrap().extend_from_slice(buf);
        buf.len()
    }
}

/// 固定のスレッドIDを返すスケジューラ
pub struct FakeScheduler(pub Pid);

impl Scheduler for FakeScheduler {
    fn active_pid(&self) -> Pid {
        self.0
    }
}

/// 呼ばれると panic する電源断（`exit` のテスト用）
pub struct FakePower {
    calls: AtomicUsize,
}

impl FakePower {
    pub const fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PowerOff for FakePower {
    fn off(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("powered off");
    }
}

/// 値を直接設定できるクロック
pub struct FakeClock(pub AtomicU64);

impl FakeClock {
    pub const fn new(us: u64) -> Self {
        Self(AtomicU64::new(us))
    }
}

impl MonotonicClock for FakeClock {
    fn now_usec(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// 呼び出しを記録し、設定した値を返す VFS
///
/// read は `data` の内容をバッファへ写す。
pub struct FakeVfs {
    ret: AtomicI64,
    data: Vec<u8>,
    calls: Mutex<Vec<String>>,
}

impl FakeVfs {
    pub fn new(ret: i64) -> Self {
        Self::with_data(ret, b"")
    }

    pub fn with_data(ret: i64, data: &[u8]) -> Self {
        Self {
            ret: AtomicI64::new(ret),
            data: data.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_ret(&self, ret: i64) {
        self.ret.store(ret, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> i64 {
        self.calls.lock().unwrap().push(call);
        self.ret.load(Ordering::SeqCst)
    }
}

impl Vfs for FakeVfs {
    fn open(&self, path: &CStr, flags: c_int, mode: c_int) -> c_int {
        self.record(format!("open {} {} {:o}", path.to_string_lossy(), flags, mode)) as c_int
    }

    fn read(&self, fd: c_int, buf: &mut [u8]) -> isize {
        let ret = self.record(format!("read {} {}", fd, buf.len()));
        if ret > 0 {
            let n = (ret as usize).min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
        }
        ret as isize
    }

    fn write(&self, fd: c_int, buf: &[u8]) -> isize {
        self.record(format!("write {} {:?}", fd, String::from_utf8_lossy(buf))) as isize
    }

    fn close(&self, fd: c_int) -> c_int {
        self.record(format!("close {}", fd)) as c_int
    }

    fn fcntl(&self, fd: c_int, cmd: c_int, arg: c_int) -> c_int {
        self.record(format!("fcntl {} {} {}", fd, cmd, arg)) as c_int
    }

    fn lseek(&self, fd: c_int, off: OffT, whence: c_int) -> OffT {
        self.record(format!("lseek {} {} {}", fd, off, whence)) as OffT
    }

    fn fstat(&self, fd: c_int, st: &mut Stat) -> c_int {
        let ret = self.record(format!("fstat {}", fd));
        if ret >= 0 {
            st.st_size = 4096;
        }
        ret as c_int
    }

    fn stat(&self, path: &CStr, st: &mut Stat) -> c_int {
        let ret = self.record(format!("stat {}", path.to_string_lossy()));
        if ret >= 0 {
            st.st_size = 4096;
        }
        ret as c_int
    }

    fn unlink(&self, path: &CStr) -> c_int {
        self.record(format!("unlink {}", path.to_string_lossy())) as c_int
    }
}
