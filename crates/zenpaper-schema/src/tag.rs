//! スパンの分類タグ

use num_enum::{IntoPrimitive, TryFromPrimitive};
use zenpaper_view::ViewError;

/// スパンの分類（1 バイト）
///
/// 閉じた列挙。ここにないバイト値はプロトコル違反として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum HighlightTag {
    /// コメント
    Comment = 0,
    /// 和音トークン
    Chord = 1,
    /// 他のトークンへの参照（カーソル位置に依存する強調に使われる）
    DependencyReference = 2,
}

impl HighlightTag {
    /// 宣言されているすべてのタグ
    pub const ALL: [HighlightTag; 3] = [
        HighlightTag::Comment,
        HighlightTag::Chord,
        HighlightTag::DependencyReference,
    ];

    /// タグバイトを解釈する
    ///
    /// # エラー
    /// - `ViewError::UnknownTag`: 列挙にない値（`address` はエラー報告用）
    pub fn from_byte(tag: u8, address: u32) -> Result<Self, ViewError> {
        HighlightTag::try_from(tag).map_err(|_| ViewError::UnknownTag { tag, address })
    }
}
