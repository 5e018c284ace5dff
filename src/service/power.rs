//! 電源断
//!
//! QEMU の `isa-debug-exit` デバイスを使って仮想マシンを終了する。
//! QEMU はプロセスの終了コードを `(value << 1) | 1` として返す。

use super::PowerOff;

/// `isa-debug-exit` の既定 I/O ポート
pub const ISA_DEBUG_EXIT_PORT: u16 = 0xf4;

/// QEMU の `isa-debug-exit` による電源断
#[derive(Debug, Clone, Copy)]
pub struct QemuExit {
    port: u16,
    value: u32,
}

impl QemuExit {
    /// 既定ポートで、指定の値を書き込む電源断を作成
    pub const fn new(value: u32) -> Self {
        Self::with_port(ISA_DEBUG_EXIT_PORT, value)
    }

    /// ポートを指定して作成
    pub const fn with_port(port: u16, value: u32) -> Self {
        Self { port, value }
    }

    /// 書き込み先の I/O ポート
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// QEMU プロセスの終了コード
    pub const fn exit_status(&self) -> u32 {
        (self.value << 1) | 1
    }
}

impl PowerOff for QemuExit {
    fn off(&self) {
        #[cfg(all(target_arch = "x86_64", target_os = "none"))]
        unsafe {
            x86_64::instructions::port::Port::<u32>::new(self.port()).write(self.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(QemuExit::new(0x10).exit_status(), 33);
        assert_eq!(QemuExit::new(0x11).exit_status(), 35);
        assert_eq!(QemuExit::new(0).port(), ISA_DEBUG_EXIT_PORT);
    }
}
