//! 単一レコードのビュー

use core::marker::PhantomData;

use zenpaper_memory::Snapshot;

use crate::error::ViewError;
use crate::record::Record;
use crate::NULL_ADDRESS;

/// `address` にある `T` 1 つを指すビュー（非所有・`Copy`）
pub struct OneView<'a, T> {
    snapshot: Snapshot<'a>,
    address: u32,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record<'a>> OneView<'a, T> {
    pub fn new(snapshot: Snapshot<'a>, address: u32) -> Self {
        OneView {
            snapshot,
            address,
            _record: PhantomData,
        }
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    /// レコードをデコードする
    pub fn get(&self) -> Result<T, ViewError> {
        T::decode(self.snapshot, self.address)
    }
}

impl<T> Clone for OneView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OneView<'_, T> {}

/// アドレス 0 を「なし」とする `OneView`
///
/// 中身を読むには必ず `unwrap()` で存在を確認する。
pub struct OptionalOneView<'a, T> {
    snapshot: Snapshot<'a>,
    address: u32,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record<'a>> OptionalOneView<'a, T> {
    pub fn new(snapshot: Snapshot<'a>, address: u32) -> Self {
        OptionalOneView {
            snapshot,
            address,
            _record: PhantomData,
        }
    }

    /// アドレスが 0 か
    pub fn is_absent(&self) -> bool {
        self.address == NULL_ADDRESS
    }

    /// 存在すれば `OneView` を返す
    pub fn unwrap(&self) -> Option<OneView<'a, T>> {
        if self.is_absent() {
            None
        } else {
            Some(OneView::new(self.snapshot, self.address))
        }
    }
}

impl<T> Clone for OptionalOneView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OptionalOneView<'_, T> {}
