//! ストライド配列のビュー

use core::marker::PhantomData;
use core::ops::Range;

use zenpaper_memory::Snapshot;

use crate::error::ViewError;
use crate::record::Record;
use crate::NULL_ADDRESS;

/// `address` から `T::SIZE` 間隔で並ぶレコード列を指すビュー
///
/// 長さは持たない（長さはレコード側、例えば `SpanCollection.len` が持つ）。
pub struct ManyView<'a, T> {
    snapshot: Snapshot<'a>,
    address: u32,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record<'a>> ManyView<'a, T> {
    pub fn new(snapshot: Snapshot<'a>, address: u32) -> Self {
        ManyView {
            snapshot,
            address,
            _record: PhantomData,
        }
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn snapshot(&self) -> Snapshot<'a> {
        self.snapshot
    }

    /// `index` 番目のレコードのアドレス
    ///
    /// # エラー
    /// - `ViewError::ArrayOverflow`: 32 ビットのアドレス空間を超える
    pub fn element_address(&self, index: u32) -> Result<u32, ViewError> {
        let offset = index as u64 * T::SIZE as u64;
        u32::try_from(self.address as u64 + offset).map_err(|_| ViewError::ArrayOverflow {
            address: self.address,
            count: index.saturating_add(1),
            size: T::SIZE,
        })
    }

    /// `index` 番目のレコードをデコードする
    pub fn get(&self, index: u32) -> Result<T, ViewError> {
        T::decode(self.snapshot, self.element_address(index)?)
    }

    /// `[range.start, range.end)` を遅延デコードするイテレータ
    ///
    /// 範囲のレコードを先にまとめてコピーすることはない。
    /// イテレータは `Clone` なので、複製すれば最初からやり直せる。
    pub fn iter(&self, range: Range<u32>) -> ManyIter<'a, T> {
        let end = range.end.max(range.start);
        ManyIter {
            view: *self,
            next: range.start,
            end,
        }
    }
}

impl<T> Clone for ManyView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ManyView<'_, T> {}

/// `ManyView` の有限・遅延イテレータ
///
/// 要素は `Result<T, ViewError>`。エラーを返した後は `None` を返し続ける
/// （壊れた配列の残りを読まない）。
pub struct ManyIter<'a, T> {
    view: ManyView<'a, T>,
    next: u32,
    end: u32,
}

impl<'a, T: Record<'a>> Iterator for ManyIter<'a, T> {
    type Item = Result<T, ViewError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = self.view.get(self.next);
        self.next += 1;
        if item.is_err() {
            self.next = self.end;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<'a, T: Record<'a>> DoubleEndedIterator for ManyIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        let item = self.view.get(self.end);
        if item.is_err() {
            self.end = self.next;
        }
        Some(item)
    }
}

impl<'a, T: Record<'a>> ExactSizeIterator for ManyIter<'a, T> {}

impl<T> Clone for ManyIter<'_, T> {
    fn clone(&self) -> Self {
        ManyIter {
            view: self.view,
            next: self.next,
            end: self.end,
        }
    }
}

/// アドレス 0 を「なし」とする `ManyView`
pub struct OptionalManyView<'a, T> {
    snapshot: Snapshot<'a>,
    address: u32,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record<'a>> OptionalManyView<'a, T> {
    pub fn new(snapshot: Snapshot<'a>, address: u32) -> Self {
        OptionalManyView {
            snapshot,
            address,
            _record: PhantomData,
        }
    }

    /// アドレスが 0 か
    pub fn is_absent(&self) -> bool {
        self.address == NULL_ADDRESS
    }

    /// 存在すれば `ManyView` を返す
    pub fn unwrap(&self) -> Option<ManyView<'a, T>> {
        if self.is_absent() {
            None
        } else {
            Some(ManyView::new(self.snapshot, self.address))
        }
    }
}

impl<T> Clone for OptionalManyView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OptionalManyView<'_, T> {}
