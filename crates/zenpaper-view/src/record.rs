//! 固定レイアウトレコードのトレイト

use zenpaper_memory::Snapshot;

use crate::error::ViewError;

/// 線形メモリ上の固定サイズレコード
///
/// 各スキーマはバイトサイズと純粋なデコード関数だけを定義する。
/// ホストはレコードを書き込まないので、エンコードは持たない。
///
/// ライフタイム `'a` はデコード結果がスナップショットを借用できるようにするため
/// （入れ子のビューを持つレコード用）。
pub trait Record<'a>: Sized {
    /// レコードのバイトサイズ（ストライド）
    const SIZE: u32;

    /// `address` にあるレコードをデコードする
    fn decode(snapshot: Snapshot<'a>, address: u32) -> Result<Self, ViewError>;
}

impl<'a> Record<'a> for u8 {
    const SIZE: u32 = 1;

    fn decode(snapshot: Snapshot<'a>, address: u32) -> Result<Self, ViewError> {
        Ok(snapshot.read_u8(address)?)
    }
}

impl<'a> Record<'a> for u32 {
    const SIZE: u32 = 4;

    fn decode(snapshot: Snapshot<'a>, address: u32) -> Result<Self, ViewError> {
        Ok(snapshot.read_u32_le(address)?)
    }
}

/// `count` 個の `size` バイトレコードが `address` から連続して
/// バッファに収まることを確認する
///
/// 配列の先頭レコードを読む前に呼び、終端 `address + count * size` を
/// 越えて読むことがないようにする。
pub fn check_array(snapshot: Snapshot<'_>, address: u32, count: u32, size: u32) -> Result<(), ViewError> {
    let total = (count as usize)
        .checked_mul(size as usize)
        .ok_or(ViewError::ArrayOverflow { address, count, size })?;
    snapshot.ensure_range(address, total)?;
    Ok(())
}
