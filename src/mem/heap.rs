//! バンプアロケータによるヒープ
//!
//! カーソルを前に進めるだけで、解放されたメモリは再利用しない。
//! newlib の malloc がこの上に自前の空きリストを作る。

use crate::error::{Errno, Result};
use crate::util::irq::IrqMutex;

/// ヒープ領域 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRegion {
    start: usize,
    end: usize,
}

impl HeapRegion {
    /// 空の領域
    pub const EMPTY: HeapRegion = HeapRegion { start: 0, end: 0 };

    /// アドレス範囲から領域を作成
    ///
    /// # 引数
    /// - `start`: 先頭アドレス
    /// - `end`: 終端アドレス（この位置までカーソルを進められる）
    ///
    /// # 戻り値
    /// `end < start` の場合は EINVAL
    pub const fn new(start: usize, end: usize) -> Result<Self> {
        if end < start {
            Err(Errno::EINVAL)
        } else {
            Ok(Self { start, end })
        }
    }

    /// ポインタ（リンカシンボル `_sheap` / `_eheap` など）から領域を作成
    ///
    /// `[start, end)` は他の用途に使われていない書き込み可能なメモリであること。
    /// 領域に触れるのは newlib の malloc だけ
    pub fn from_raw(start: *const u8, end: *const u8) -> Result<Self> {
        Self::new(start as usize, end as usize)
    }

    /// 先頭アドレス
    pub const fn start(&self) -> usize {
        self.start
    }

    /// 終端アドレス
    pub const fn end(&self) -> usize {
        self.end
    }

    /// 領域のサイズ（バイト）
    pub const fn size(&self) -> usize {
        self.end - self.start
    }

    /// カーソルとして有効なアドレスかどうか
    pub const fn contains(&self, addr: usize) -> bool {
        self.start <= addr && addr <= self.end
    }
}

#[derive(Debug)]
struct HeapState {
    region: HeapRegion,
    cursor: usize,
}

/// 単調増加するヒープカーソル
///
/// カーソルの確認と更新は割込みを無効化したロックの中で行うため、
/// 割込みハンドラからの確保要求とも競合しない。
pub struct BumpHeap {
    state: IrqMutex<HeapState>,
}

impl BumpHeap {
    /// 領域を割り当てていないヒープ（`init` で設定する）
    pub const fn empty() -> Self {
        Self::new(HeapRegion::EMPTY)
    }

    /// 領域の先頭にカーソルを置いたヒープを作成
    pub const fn new(region: HeapRegion) -> Self {
        Self {
            state: IrqMutex::new(HeapState {
                region,
                cursor: region.start,
            }),
        }
    }

    /// 領域を設定し、カーソルを先頭に戻す
    pub fn init(&self, region: HeapRegion) {
        let mut state = self.state.lock();
        state.region = region;
        state.cursor = region.start;
    }

    /// カーソルを `incr` バイト動かす
    ///
    /// # 引数
    /// - `incr`: 移動量（負の値も領域内であれば受け付ける）
    ///
    /// # 戻り値
    /// 移動前のカーソル。領域外へ出る場合は ENOMEM で、カーソルは変わらない
    pub fn sbrk(&self, incr: isize) -> Result<*mut u8> {
        let ret = {
            let mut state = self.state.lock();
            let old = state.cursor;
            match old.checked_add_signed(incr) {
                Some(new) if state.region.contains(new) => {
                    state.cursor = new;
                    Ok(old)
                }
                _ => Err(Errno::ENOMEM),
            }
        };

        match ret {
            Ok(old) => crate::trace!("sbrk: {} bytes at {:#x}", incr, old),
            Err(_) => crate::debug!("sbrk: cannot move heap cursor by {} bytes", incr),
        }
        ret.map(|old| old as *mut u8)
    }

    /// 現在のカーソル
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// ヒープ領域
    pub fn region(&self) -> HeapRegion {
        self.state.lock().region
    }

    /// 残りのバイト数
    pub fn remaining(&self) -> usize {
        let state = self.state.lock();
        state.region.end - state.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: usize = 0x2000_0000;

    fn heap(size: usize) -> BumpHeap {
        BumpHeap::new(HeapRegion::new(BASE, BASE + size).unwrap())
    }

    #[test]
    fn test_region_rejects_inverted_bounds() {
        assert_eq!(HeapRegion::new(0x2000, 0x1000), Err(Errno::EINVAL));
        assert_eq!(HeapRegion::new(0x1000, 0x1000).unwrap().size(), 0);
    }

    #[test]
    fn test_region_from_linker_symbols() {
        let mem = [0u8; 64];
        let start = mem.as_ptr();
        let end = start.wrapping_add(mem.len());

        let region = HeapRegion::from_raw(start, end).unwrap();
        assert_eq!(region.start(), start as usize);
        assert_eq!(region.size(), 64);
        assert_eq!(HeapRegion::from_raw(end, start), Err(Errno::EINVAL));
    }

    #[test]
    fn test_sbrk_returns_previous_cursor() {
        let h = heap(1000);
        assert_eq!(h.sbrk(16).unwrap() as usize, BASE);
        assert_eq!(h.sbrk(32).unwrap() as usize, BASE + 16);
        assert_eq!(h.sbrk(0).unwrap() as usize, BASE + 48);
        assert_eq!(h.cursor(), BASE + 48);
        assert_eq!(h.remaining(), 952);
    }

    #[test]
    fn test_sbrk_grow_then_shrink() {
        let h = heap(1000);
        assert_eq!(h.sbrk(100).unwrap() as usize, BASE);
        assert_eq!(h.cursor(), BASE + 100);
        assert_eq!(h.sbrk(-50).unwrap() as usize, BASE + 100);
        assert_eq!(h.cursor(), BASE + 50);
    }

    #[test]
    fn test_sbrk_can_fill_region_exactly() {
        let h = heap(1000);
        assert!(h.sbrk(1000).is_ok());
        assert_eq!(h.remaining(), 0);
        assert_eq!(h.sbrk(1), Err(Errno::ENOMEM));
    }

    #[test]
    fn test_sbrk_out_of_bounds_leaves_cursor() {
        let h = heap(1000);
        h.sbrk(600).unwrap();
        assert_eq!(h.sbrk(401), Err(Errno::ENOMEM));
        assert_eq!(h.cursor(), BASE + 600);
        assert_eq!(h.sbrk(-601), Err(Errno::ENOMEM));
        assert_eq!(h.cursor(), BASE + 600);
        assert_eq!(h.sbrk(isize::MAX), Err(Errno::ENOMEM));
        assert_eq!(h.sbrk(isize::MIN), Err(Errno::ENOMEM));
        assert_eq!(h.cursor(), BASE + 600);
    }

    #[test]
    fn test_cumulative_advance_matches_deltas() {
        let h = heap(4096);
        let deltas = [8isize, 120, 0, 1024, -64, 512, 2048, -1000, 1400];
        let mut expected = BASE;
        for d in deltas {
            let prev = h.sbrk(d).unwrap() as usize;
            assert_eq!(prev, expected);
            expected = (expected as isize + d) as usize;
            assert_eq!(h.cursor(), expected);
        }
    }

    #[test]
    fn test_empty_heap_and_init() {
        let h = BumpHeap::empty();
        assert_eq!(h.sbrk(1), Err(Errno::ENOMEM));
        h.init(HeapRegion::new(BASE, BASE + 64).unwrap());
        assert_eq!(h.sbrk(64).unwrap() as usize, BASE);
        assert_eq!(h.region().end(), BASE + 64);
    }
}
