//! # zenpaper-memory
//!
//! ホストと解析モジュールが共有する線形メモリ（WASM linear memory）の抽象化。
//!
//! ## 設計の背景
//!
//! 解析モジュールはサンドボックス内で動作し、ホストとは共有バイト列でしか
//! やり取りできない。モジュールはメモリを成長（grow）させることがあり、
//! その際バッファ全体が再配置される。つまり呼び出し前に得たアドレスや
//! スライスは呼び出し後には信用できない。
//!
//! ## 世代（generation）とスナップショット
//!
//! ```text
//! memory.generation()          成長・再配置のたびに変化するカウンタ
//! memory.with_snapshot(|s| ..) 現在のバイト列を借用した読み取り専用ビュー
//!                               （クロージャの外へは持ち出せない）
//! ```
//!
//! デコードは常に「モジュール呼び出しが戻った後」に新しいスナップショットを
//! 取って行う。スナップショットの寿命はクロージャに閉じているため、
//! 古いビューを次の呼び出しまで保持することは型レベルで不可能になる。

#![no_std]
extern crate alloc;

use alloc::vec::Vec;

pub mod error;
pub mod host;
pub mod snapshot;

pub use error::MemoryError;
pub use host::HostMemory;
pub use snapshot::{ByteSource, Snapshot};

/// WASM のページサイズ（バイト）
pub const PAGE_SIZE: usize = 65_536;

/// 初期ページ数（32 ページ = 2 MiB）
/// エディタの楽譜テキストには十分な大きさ
pub const DEFAULT_INITIAL_PAGES: u32 = 32;

/// ホストとモジュールが共有する線形メモリ
///
/// ホスト側は生のバイト列の書き込み（入力テキスト）と読み出し（結果のデコード）
/// だけを行う。構造化されたレコードを書き込むことはない。
pub trait LinearMemory {
    /// 現在のバイト長
    fn byte_len(&self) -> usize;

    /// バッキングストアの世代
    ///
    /// 成長または再配置のたびに値が変わる。同じ値である間は、
    /// 以前に読んだアドレスが同じバイト列を指している。
    fn generation(&self) -> u64;

    /// `address` から `bytes` を書き込む
    ///
    /// # エラー
    /// - `MemoryError::OutOfBounds`: 書き込み範囲がバッファ長を超える
    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryError>;

    /// `[address, address + len)` をコピーして返す
    ///
    /// # エラー
    /// - `MemoryError::OutOfBounds`: 読み出し範囲がバッファ長を超える
    fn read(&self, address: u32, len: u32) -> Result<Vec<u8>, MemoryError>;

    /// 現在のバイト列のスナップショットをクロージャに渡す
    ///
    /// スナップショットはクロージャの中でのみ有効。
    fn with_snapshot<R>(&self, f: impl FnOnce(Snapshot<'_>) -> R) -> R
    where
        Self: Sized;
}

/// `[address, address + len)` がバッファ長 `memory_len` に収まるか検証する
pub fn check_range(address: u32, len: usize, memory_len: usize) -> Result<core::ops::Range<usize>, MemoryError> {
    let start = address as usize;
    match start.checked_add(len) {
        Some(end) if end <= memory_len => Ok(start..end),
        _ => Err(MemoryError::OutOfBounds {
            address,
            len,
            memory_len,
        }),
    }
}
