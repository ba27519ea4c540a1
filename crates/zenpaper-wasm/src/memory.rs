//! `WebAssembly.Memory` を線形メモリとして扱う

use alloc::vec::Vec;

use js_sys::{Object, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::prelude::*;
use zenpaper_memory::{check_range, ByteSource, LinearMemory, MemoryError, Snapshot, PAGE_SIZE};

/// JS 側の `WebAssembly.Memory`
///
/// モジュールに `env.memory` として渡すので、モジュールとホストが同じ
/// バッファを見る。`memory.grow` のたびに `ArrayBuffer` は取り替えられるため、
/// ビュー（`Uint8Array`）は操作のたびに作り直す。
///
/// WASM のメモリは縮まないので、ページ数をそのまま世代として使う。
#[derive(Clone)]
pub struct JsMemory {
    memory: WebAssembly::Memory,
}

impl JsMemory {
    /// `initial_pages` ページのメモリを確保する
    ///
    /// # エラー
    /// - `WebAssembly.Memory` の生成失敗（ページ数が上限を超えるなど）
    pub fn new(initial_pages: u32, max_pages: Option<u32>) -> Result<Self, JsValue> {
        let descriptor = Object::new();
        Reflect::set(&descriptor, &"initial".into(), &initial_pages.into())?;
        if let Some(max) = max_pages {
            Reflect::set(&descriptor, &"maximum".into(), &max.into())?;
        }
        Ok(JsMemory {
            memory: WebAssembly::Memory::new(&descriptor)?,
        })
    }

    /// インポートオブジェクトに渡す JS 値
    pub fn as_js(&self) -> &JsValue {
        self.memory.as_ref()
    }

    fn view(&self) -> Uint8Array {
        Uint8Array::new(&self.memory.buffer())
    }
}

impl LinearMemory for JsMemory {
    fn byte_len(&self) -> usize {
        self.view().length() as usize
    }

    fn generation(&self) -> u64 {
        (self.byte_len() / PAGE_SIZE) as u64
    }

    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        let view = self.view();
        let range = check_range(address, bytes.len(), view.length() as usize)?;
        view.subarray(range.start as u32, range.end as u32).copy_from(bytes);
        Ok(())
    }

    fn read(&self, address: u32, len: u32) -> Result<Vec<u8>, MemoryError> {
        let view = self.view();
        let range = check_range(address, len as usize, view.length() as usize)?;
        Ok(view.subarray(range.start as u32, range.end as u32).to_vec())
    }

    /// 現在の `ArrayBuffer` を固定したスナップショットを渡す
    ///
    /// バッファ全体はコピーしない。レコードを読むたびに、その範囲だけを
    /// `subarray` 経由で Rust 側にコピーする。
    fn with_snapshot<R>(&self, f: impl FnOnce(Snapshot<'_>) -> R) -> R {
        let view = ArrayView::new(self.view());
        let generation = (view.len / PAGE_SIZE) as u64;
        f(Snapshot::from_source(&view, generation))
    }
}

/// ある時点の `ArrayBuffer` 上のビュー
///
/// `memory.grow` は `ArrayBuffer` を取り替えるが、このビューは取得時の
/// バッファを指し続ける。スナップショットの寿命の間はモジュールを
/// 呼ばないので、取り替えが起きることはない。
struct ArrayView {
    array: Uint8Array,
    len: usize,
}

impl ArrayView {
    fn new(array: Uint8Array) -> Self {
        let len = array.length() as usize;
        ArrayView { array, len }
    }
}

impl ByteSource for ArrayView {
    fn byte_len(&self) -> usize {
        self.len
    }

    fn copy_to(&self, start: usize, out: &mut [u8]) {
        let end = start + out.len();
        self.array.subarray(start as u32, end as u32).copy_to(out);
    }
}
