//! スパン（分類付きのバイト範囲）
//!
//! ## Layout (9 bytes, packed)
//! ```text
//! [0]      tag:   u8
//! [1..5)   start: u32 LE
//! [5..9)   end:   u32 LE
//! ```

use zenpaper_memory::Snapshot;
use zenpaper_view::{Record, ViewError};

use crate::tag::HighlightTag;

/// 分類されたバイト範囲 `[start, end)`
///
/// オフセットは最後に送信したテキストのバイト位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub tag: HighlightTag,
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// バイト長
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `offset` を含むか（終端は含まない）
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// 長さ `text_len` のテキストに収まっていることを確認する
    pub fn check_within(self, text_len: u32) -> Result<Self, ViewError> {
        if self.end > text_len {
            return Err(ViewError::SpanOutOfText {
                start: self.start,
                end: self.end,
                text_len,
            });
        }
        Ok(self)
    }
}

impl<'a> Record<'a> for Span {
    const SIZE: u32 = 9;

    fn decode(snapshot: Snapshot<'a>, address: u32) -> Result<Self, ViewError> {
        // レコード全体を 1 回で読む（途中まで読んで失敗することはない）
        let bytes: [u8; 9] = snapshot.read_array(address)?;

        let tag = HighlightTag::from_byte(bytes[0], address)?;
        let start = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let end = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);

        if start > end {
            return Err(ViewError::InvertedSpan { start, end, address });
        }

        Ok(Span { tag, start, end })
    }
}
