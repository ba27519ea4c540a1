//! ホスト所有の線形メモリ実装

use alloc::vec;
use alloc::vec::Vec;

use crate::error::MemoryError;
use crate::snapshot::Snapshot;
use crate::{check_range, LinearMemory};

/// `Vec<u8>` を背後に持つ線形メモリ
///
/// ネイティブのホストとテストで使う。ブラウザでは `zenpaper-wasm` の
/// `JsMemory` が同じトレイトを実装する。
///
/// ## 成長と再配置
///
/// `grow` は常に新しいバッキングストアを確保してコピーする。
/// WASM の `memory.grow` と同じく、成長後は古いバッファを指していた
/// アドレス由来の参照はすべて無効になる。`relocate` はサイズを変えずに
/// 再配置だけを行う（テストで古いバイトを読んでいないことを確かめる用）。
pub struct HostMemory {
    /// バッキングストア
    bytes: Vec<u8>,
    /// 成長の上限（バイト）。`None` なら無制限
    max_len: Option<usize>,
    /// 成長・再配置のたびに 1 増える
    generation: u64,
}

impl HostMemory {
    /// `initial_len` バイトのゼロ埋めメモリを作る
    pub fn new(initial_len: usize) -> Self {
        HostMemory {
            bytes: vec![0u8; initial_len],
            max_len: None,
            generation: 0,
        }
    }

    /// WASM ページ単位でメモリを作る
    pub fn with_pages(initial_pages: u32) -> Self {
        Self::new(initial_pages as usize * crate::PAGE_SIZE)
    }

    /// 成長の上限を設定する
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// `additional` バイトだけ成長させ、成長前の長さを返す
    ///
    /// 新しい領域はゼロ埋めされる。
    ///
    /// # エラー
    /// - `MemoryError::GrowthRefused`: 上限を超える
    pub fn grow(&mut self, additional: usize) -> Result<usize, MemoryError> {
        let old_len = self.bytes.len();
        let requested = old_len.saturating_add(additional);
        if let Some(max) = self.max_len {
            if requested > max {
                return Err(MemoryError::GrowthRefused { requested, max });
            }
        }

        // 必ず新しいストアへ移す（Vec::resize だとその場で伸びることがある）
        let mut moved = Vec::with_capacity(requested);
        moved.extend_from_slice(&self.bytes);
        moved.resize(requested, 0);
        self.bytes = moved;
        self.generation += 1;
        Ok(old_len)
    }

    /// サイズを変えずにバッキングストアを移し替える
    pub fn relocate(&mut self) {
        self.bytes = self.bytes.clone();
        self.generation += 1;
    }

    /// バッキングストアへの可変参照（モジュール側の書き込み用）
    ///
    /// ホストのコードはレコードを書き込まない。これは解析モジュールを
    /// ネイティブで動かす実装（テストのフェイクを含む）のためのもの。
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl LinearMemory for HostMemory {
    fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        let range = check_range(address, bytes.len(), self.bytes.len())?;
        self.bytes[range].copy_from_slice(bytes);
        Ok(())
    }

    fn read(&self, address: u32, len: u32) -> Result<Vec<u8>, MemoryError> {
        let range = check_range(address, len as usize, self.bytes.len())?;
        Ok(self.bytes[range].to_vec())
    }

    fn with_snapshot<R>(&self, f: impl FnOnce(Snapshot<'_>) -> R) -> R {
        f(Snapshot::new(&self.bytes, self.generation))
    }
}
