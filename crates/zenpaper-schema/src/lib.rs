//! # zenpaper-schema
//!
//! 解析モジュールが線形メモリに書き出すレコードのレイアウトと、
//! プロトコル世代ごとのインターフェース契約。
//!
//! ## レコード（リトルエンディアン、パディングなし）
//!
//! ```text
//! Span           (9 bytes): [tag: u8][start: u32][end: u32]
//! SpanCollection (8 bytes): [ptr: u32 (0 = なし)][len: u32]
//! UpdateResult   (8 bytes): [SpanCollection]
//! ```
//!
//! ## 結果の参照関係
//!
//! ```text
//! endUpdate() ──▶ UpdateResult ──▶ SpanCollection.ptr ──▶ Span[len]
//! moveCursor() ─────────────────▶ SpanCollection.ptr ──▶ Span[len]
//! ```
//!
//! どのレコードもデコード専用。ホストが書き込むのは入力テキストの生バイトだけ。

#![no_std]
extern crate alloc;

pub mod collection;
pub mod contract;
pub mod span;
pub mod tag;

pub use collection::{SpanCollection, Spans, SpansWithin, UpdateResult};
pub use contract::{ExportSpec, InterfaceContract, ProtocolVersion, ResultShape, IMPORT_MODULE, MEMORY_IMPORT};
pub use span::Span;
pub use tag::HighlightTag;
