//! 線形メモリのエラー型

use thiserror::Error;

/// 線形メモリ操作のエラー
///
/// どちらもホストとモジュールの間のバッファ寿命・スキーマの食い違いを意味し、
/// 回復を試みずにその操作を打ち切る。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// アクセス範囲がバッファ長を超えている
    #[error("Memory access out of bounds: [{address}, +{len}) exceeds buffer of {memory_len} bytes")]
    OutOfBounds {
        address: u32,
        len: usize,
        memory_len: usize,
    },
    /// 最大サイズを超える成長要求
    #[error("Memory growth refused: {requested} bytes requested, maximum is {max}")]
    GrowthRefused { requested: usize, max: usize },
}
