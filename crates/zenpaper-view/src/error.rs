//! zenpaper-view エラー型

use thiserror::Error;
use zenpaper_memory::MemoryError;

/// デコード時のプロトコル違反
///
/// いずれもホストとモジュールのスキーマ不一致、またはバッファ寿命の違反を
/// 意味する。デコードはその場で打ち切り、部分的な結果は返さない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// アドレスがバッファ外を指している
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// レコード配列の終端がアドレス空間を超える
    #[error("Record array at {address} overflows: {count} records of {size} bytes")]
    ArrayOverflow { address: u32, count: u32, size: u32 },
    /// 列挙に存在しないタグバイト
    #[error("Unknown highlight tag {tag} at address {address}")]
    UnknownTag { tag: u8, address: u32 },
    /// start > end のスパン
    #[error("Inverted span [{start}, {end}) at address {address}")]
    InvertedSpan { start: u32, end: u32, address: u32 },
    /// 送信したテキストの外を指すスパン
    #[error("Span [{start}, {end}) extends past submitted text of {text_len} bytes")]
    SpanOutOfText { start: u32, end: u32, text_len: u32 },
}
