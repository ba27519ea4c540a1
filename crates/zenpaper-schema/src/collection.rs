//! スパンの集合と更新結果
//!
//! ## SpanCollection (8 bytes)
//! ```text
//! [0..4)  ptr: u32 LE  (0 = なし)
//! [4..8)  len: u32 LE
//! ```
//!
//! ## UpdateResult (8 bytes)
//! ```text
//! [0..8)  SpanCollection
//! ```
//! `UpdateResult` は今のところ `SpanCollection` を包むだけだが、
//! プロトコル拡張のために別レコードとして扱う。

use alloc::vec::Vec;

use zenpaper_memory::Snapshot;
use zenpaper_view::{check_array, ManyIter, OptionalManyView, Record, ViewError};

use crate::span::Span;

/// ポインタ + 長さで表される `Span` の連続配列
///
/// `ptr == 0` または `len == 0` はどちらも空集合。
#[derive(Clone, Copy)]
pub struct SpanCollection<'a> {
    highlights: OptionalManyView<'a, Span>,
    len: u32,
}

impl<'a> SpanCollection<'a> {
    /// 空の集合（結果アドレスが 0 のとき）
    pub fn empty(snapshot: Snapshot<'a>) -> Self {
        SpanCollection {
            highlights: OptionalManyView::new(snapshot, zenpaper_view::NULL_ADDRESS),
            len: 0,
        }
    }

    /// 実効的な要素数（ポインタがなければ 0）
    pub fn len(&self) -> u32 {
        if self.highlights.is_absent() {
            0
        } else {
            self.len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// スパンを遅延デコードするイテレータを返す
    ///
    /// 配列全体 `ptr + len * 9` がバッファに収まることを先に確認するので、
    /// イテレータが配列の外を読むことはない。
    ///
    /// # エラー
    /// - 配列がバッファ外にはみ出している
    pub fn iter(&self) -> Result<Spans<'a>, ViewError> {
        let many = match self.highlights.unwrap() {
            Some(many) => many,
            None => {
                if self.len > 0 {
                    log::warn!(
                        "span collection has len {} but no pointer; treating as empty",
                        self.len
                    );
                }
                return Ok(Spans { inner: None });
            }
        };
        if self.len == 0 {
            return Ok(Spans { inner: None });
        }

        check_array(many.snapshot(), many.address(), self.len, Span::SIZE)?;
        Ok(Spans {
            inner: Some(many.iter(0..self.len)),
        })
    }

    /// テキスト長 `text_len` を超えるスパンもエラーにするイテレータ
    pub fn spans_within(&self, text_len: u32) -> Result<SpansWithin<'a>, ViewError> {
        Ok(SpansWithin {
            inner: self.iter()?,
            text_len,
        })
    }

    /// すべてのスパンをデコードして返す
    ///
    /// 途中で 1 つでも不正なレコードがあれば全体がエラー。
    pub fn to_vec(&self) -> Result<Vec<Span>, ViewError> {
        self.iter()?.collect()
    }
}

impl<'a> Record<'a> for SpanCollection<'a> {
    const SIZE: u32 = 8;

    fn decode(snapshot: Snapshot<'a>, address: u32) -> Result<Self, ViewError> {
        let bytes: [u8; 8] = snapshot.read_array(address)?;
        let ptr = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok(SpanCollection {
            highlights: OptionalManyView::new(snapshot, ptr),
            len,
        })
    }
}

impl core::fmt::Debug for SpanCollection<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpanCollection")
            .field("absent", &self.highlights.is_absent())
            .field("len", &self.len)
            .finish()
    }
}

/// `SpanCollection::iter` のイテレータ
#[derive(Clone)]
pub struct Spans<'a> {
    inner: Option<ManyIter<'a, Span>>,
}

impl<'a> Iterator for Spans<'a> {
    type Item = Result<Span, ViewError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(inner) => inner.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for Spans<'_> {}

/// `SpanCollection::spans_within` のイテレータ
#[derive(Clone)]
pub struct SpansWithin<'a> {
    inner: Spans<'a>,
    text_len: u32,
}

impl SpansWithin<'_> {
    /// 検証に使うテキスト長
    pub fn text_len(&self) -> u32 {
        self.text_len
    }
}

impl<'a> Iterator for SpansWithin<'a> {
    type Item = Result<Span, ViewError>;

    fn next(&mut self) -> Option<Self::Item> {
        let text_len = self.text_len;
        let item = self.inner.next()?;
        Some(item.and_then(|span| span.check_within(text_len)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SpansWithin<'_> {}

/// 全文更新の結果（`SpanCollection` の封筒）
#[derive(Debug, Clone, Copy)]
pub struct UpdateResult<'a> {
    pub highlights: SpanCollection<'a>,
}

impl<'a> Record<'a> for UpdateResult<'a> {
    const SIZE: u32 = 8;

    fn decode(snapshot: Snapshot<'a>, address: u32) -> Result<Self, ViewError> {
        Ok(UpdateResult {
            highlights: SpanCollection::decode(snapshot, address)?,
        })
    }
}
