//! シリアルポートコンソール
//!
//! 16550 互換 UART を使ったブロッキング入出力

use spin::Mutex;
use x86_64::instructions::port::Port;

use super::Console;
use crate::util::irq;

/// COM1 のベースポート
pub const COM1: u16 = 0x3F8;

/// ラインステータス: 受信データあり
const LSR_DATA_READY: u8 = 0x01;
/// ラインステータス: 送信バッファ空き
const LSR_THR_EMPTY: u8 = 0x20;

/// UARTシリアルポート
struct SerialPort {
    /// データ
    data: Port<u8>,
    /// 割り込み有効化
    int_en: Port<u8>,
    /// FIFO制御
    fifo_ctrl: Port<u8>,
    /// ライン制御
    line_ctrl: Port<u8>,
    /// モデム制御
    modem_ctrl: Port<u8>,
    /// ラインステータス
    line_status: Port<u8>,
}

impl SerialPort {
    const fn new(base: u16) -> Self {
        Self {
            data: Port::new(base),
            int_en: Port::new(base + 1),
            fifo_ctrl: Port::new(base + 2),
            line_ctrl: Port::new(base + 3),
            modem_ctrl: Port::new(base + 4),
            line_status: Port::new(base + 5),
        }
    }

    fn init(&mut self) {
        unsafe {
            // 割り込み無効
            self.int_en.write(0x00);
            // ボーレート設定を有効化
            self.line_ctrl.write(0x80);
            // ボーレート = 38400 (divisor = 3)
            self.data.write(0x03);
            self.int_en.write(0x00);
            // 8ビット, パリティなし, 1ストップビット
            self.line_ctrl.write(0x03);
            // FIFOを有効化, クリア, 14バイトしきい値
            self.fifo_ctrl.write(0xC7);
            // データ端末レディ, リクエスト送信
            self.modem_ctrl.write(0x0B);
        }
    }

    fn status(&mut self) -> u8 {
        unsafe { self.line_status.read() }
    }

    fn send_byte(&mut self, byte: u8) {
        while self.status() & LSR_THR_EMPTY == 0 {
            core::hint::spin_loop();
        }
        unsafe { self.data.write(byte) }
    }

    fn try_recv_byte(&mut self) -> Option<u8> {
        if self.status() & LSR_DATA_READY == 0 {
            None
        } else {
            Some(unsafe { self.data.read() })
        }
    }
}

/// UART コンソール
///
/// 受信バッファは持たない。読み込みの合間に届いたバイトは
/// UART の FIFO があふれた時点で失われる。
pub struct SerialConsole {
    port: Mutex<SerialPort>,
}

impl SerialConsole {
    /// ベースポートを指定して作成
    pub const fn new(base: u16) -> Self {
        Self {
            port: Mutex::new(SerialPort::new(base)),
        }
    }

    /// COM1 のコンソール
    pub const fn com1() -> Self {
        Self::new(COM1)
    }
}

impl Console for SerialConsole {
    fn init(&self) {
        irq::without_interrupts(|| self.port.lock().init());
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        // 最初の1バイトが届くまではロックを握らずに待つ
        let first = loop {
            if let Some(b) = irq::without_interrupts(|| self.port.lock().try_recv_byte()) {
                break b;
            }
            core::hint::spin_loop();
        };
        buf[0] = first;

        irq::without_interrupts(|| {
            let mut port = self.port.lock();
            let mut n = 1;
            while n < buf.len() {
                match port.try_recv_byte() {
                    Some(b) => {
                        buf[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            n
        })
    }

    fn write(&self, buf: &[u8]) -> usize {
        irq::without_interrupts(|| {
            let mut port = self.port.lock();
            for &b in buf {
                port.send_byte(b);
            }
        });
        buf.len()
    }
}
