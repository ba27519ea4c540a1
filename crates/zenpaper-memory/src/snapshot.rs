//! 線形メモリのスナップショット
//!
//! ある世代のバイト列に対する読み取り専用ビュー。
//! 整数はすべてリトルエンディアン。
//!
//! ## バイト列の持ち方
//!
//! ```text
//! Snapshot::new(&[u8])              ホスト側のスライスをそのまま借用（コピーなし）
//! Snapshot::from_source(&dyn ..)    読むたびに必要な範囲だけをコピーする
//!                                   （JS の ArrayBuffer など、借用できないもの）
//! ```
//!
//! どちらの場合もレコードを読むときに要求した範囲しか触らない。

use core::fmt;

use crate::check_range;
use crate::error::MemoryError;

/// 範囲を指定してコピーできるバイト列
///
/// `copy_to` に渡される範囲は `Snapshot` が事前に検証している。
pub trait ByteSource {
    /// バイト長
    fn byte_len(&self) -> usize;

    /// `[start, start + out.len())` を `out` にコピーする
    fn copy_to(&self, start: usize, out: &mut [u8]);
}

impl ByteSource for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn copy_to(&self, start: usize, out: &mut [u8]) {
        out.copy_from_slice(&self[start..start + out.len()]);
    }
}

#[derive(Clone, Copy)]
enum Bytes<'a> {
    Slice(&'a [u8]),
    Source(&'a dyn ByteSource),
}

/// 線形メモリのスナップショット（`Copy`、非所有）
///
/// `LinearMemory::with_snapshot` のクロージャ内でのみ得られる。
/// 借用しているため、次のモジュール呼び出し（`&mut` を要求する）までに
/// 必ず破棄される。
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    bytes: Bytes<'a>,
    generation: u64,
}

impl<'a> Snapshot<'a> {
    /// バイト列と世代からスナップショットを作る
    pub fn new(bytes: &'a [u8], generation: u64) -> Self {
        Snapshot {
            bytes: Bytes::Slice(bytes),
            generation,
        }
    }

    /// 範囲ごとにコピーするバイト列からスナップショットを作る
    pub fn from_source(source: &'a dyn ByteSource, generation: u64) -> Self {
        Snapshot {
            bytes: Bytes::Source(source),
            generation,
        }
    }

    /// スナップショット取得時の世代
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// バイト長
    pub fn len(&self) -> usize {
        match self.bytes {
            Bytes::Slice(bytes) => bytes.len(),
            Bytes::Source(source) => source.byte_len(),
        }
    }

    /// 長さ 0 か
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `[address, address + len)` が範囲内であることを確認する（読まない）
    pub fn ensure_range(&self, address: u32, len: usize) -> Result<(), MemoryError> {
        check_range(address, len, self.len()).map(|_| ())
    }

    /// `address` から `N` バイトを読む
    pub fn read_array<const N: usize>(&self, address: u32) -> Result<[u8; N], MemoryError> {
        let range = check_range(address, N, self.len())?;
        let mut out = [0u8; N];
        match self.bytes {
            Bytes::Slice(bytes) => out.copy_from_slice(&bytes[range]),
            Bytes::Source(source) => source.copy_to(range.start, &mut out),
        }
        Ok(out)
    }

    /// `address` の 1 バイトを読む
    pub fn read_u8(&self, address: u32) -> Result<u8, MemoryError> {
        let [byte] = self.read_array::<1>(address)?;
        Ok(byte)
    }

    /// `address` から u32（LE）を読む
    pub fn read_u32_le(&self, address: u32) -> Result<u32, MemoryError> {
        Ok(u32::from_le_bytes(self.read_array(address)?))
    }
}

impl fmt::Debug for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("len", &self.len())
            .field("generation", &self.generation)
            .finish()
    }
}
