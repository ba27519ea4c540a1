//! 解析モジュールのアダプタ
//!
//! バッファの所有、起動時の契約照合、全文更新とカーソル移動の
//! 2 つの呼び出し契約を担当する。

use alloc::vec::Vec;

use zenpaper_memory::LinearMemory;
use zenpaper_schema::{InterfaceContract, ResultShape, Span, SpansWithin};
use zenpaper_view::ViewError;

use crate::error::{AgentError, BootError};
use crate::module::AnalysisModule;
use crate::AgentConfig;

/// 呼び出し統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStats {
    /// 全文更新の回数
    pub updates: u64,
    /// カーソル移動の回数
    pub cursor_moves: u64,
    /// 呼び出し中にメモリが成長・再配置された回数
    pub growths: u64,
}

/// 起動済みの解析モジュールとその共有バッファ
///
/// ## 処理フロー
///
/// ```text
/// 全文更新:
///   1. startUpdate(len)  → a
///   2. memory[a..a+len] ← text
///   3. endUpdate()       → r（0 = スパンなし）
///   4. r を新しいスナップショットでデコード
///
/// カーソル移動:
///   1. moveCursor(position) → r
///   2. r を SpanCollection として直接デコード
/// ```
///
/// ## スレッド安全性・再入
///
/// すべての呼び出しは `&mut self` を取るので、同時に 2 つの要求が
/// 走ることはない。デコード結果のビューはクロージャ内のスナップショットを
/// 借用しており、次の呼び出しまで持ち越せない。
pub struct WasmAgent<M: AnalysisModule> {
    /// 解析モジュール（共有メモリを所有する）
    module: M,
    /// 起動時に照合した契約
    contract: &'static InterfaceContract,
    /// 最後に送信したテキストのバイト長
    document_len: Option<u32>,
    stats: AgentStats,
}

impl<M: AnalysisModule> WasmAgent<M> {
    /// 契約を照合してアダプタを起動する
    ///
    /// # エラー
    /// - `BootError::MissingExport`: 契約のエクスポートがない
    /// - `BootError::ArityMismatch`: 引数の数が違う
    pub fn boot(module: M, config: &AgentConfig) -> Result<Self, BootError> {
        let contract = config.protocol.contract();

        for export in contract.exports() {
            match module.export_arity(export.name) {
                None => return Err(BootError::MissingExport { name: export.name }),
                Some(found) if found != export.params => {
                    return Err(BootError::ArityMismatch {
                        name: export.name,
                        expected: export.params,
                        found,
                    });
                }
                Some(_) => {}
            }
        }

        log::info!(
            "analysis module booted: protocol {:?}, {} bytes of linear memory",
            contract.version,
            module.memory().byte_len()
        );

        Ok(WasmAgent {
            module,
            contract,
            document_len: None,
            stats: AgentStats::default(),
        })
    }

    pub fn contract(&self) -> &'static InterfaceContract {
        self.contract
    }

    /// カーソル移動の契約を持つか
    pub fn supports_cursor(&self) -> bool {
        self.contract.move_cursor.is_some()
    }

    /// 最後に送信したテキストのバイト長
    pub fn document_len(&self) -> Option<u32> {
        self.document_len
    }

    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    /// テキスト全体を送信し、分類結果をすべてデコードして返す
    pub fn update_document(&mut self, text: &str) -> Result<Vec<Span>, AgentError> {
        self.update_document_with(text, |spans| spans.collect())
    }

    /// テキスト全体を送信し、分類結果をクロージャで消費する
    ///
    /// クロージャには遅延イテレータが渡る。必要なスパンだけ読めばよく、
    /// イテレータはクロージャの外へ持ち出せない。
    ///
    /// # エラー
    /// - `AgentError::TextTooLong`: 4 GiB 以上のテキスト
    /// - `AgentError::Module`: モジュールの trap
    /// - `AgentError::Memory`: 返された書き込み先に収まらない
    /// - `AgentError::Protocol`: 結果のデコードでプロトコル違反
    pub fn update_document_with<R>(
        &mut self,
        text: &str,
        f: impl FnOnce(SpansWithin<'_>) -> Result<R, ViewError>,
    ) -> Result<R, AgentError> {
        let len = u32::try_from(text.len()).map_err(|_| AgentError::TextTooLong { len: text.len() })?;
        let contract = self.contract;
        let generation = self.module.memory().generation();

        let address = self.module.call(contract.start_update.name, &[len])?;
        self.module.memory_mut().write(address, text.as_bytes())?;
        let result = self.module.call(contract.end_update.name, &[])?;

        // 以前のテキストに対するスパンはここで無効になる
        self.document_len = Some(len);
        self.stats.updates += 1;
        self.note_generation(generation, contract.end_update.name);

        log::debug!(
            "{}({}) -> {}, {}() -> {}",
            contract.start_update.name,
            len,
            address,
            contract.end_update.name,
            result
        );

        self.decode(contract.update_result, result, len, f)
    }

    /// カーソル位置に依存するスパンを問い合わせて返す
    pub fn move_cursor(&mut self, position: u32) -> Result<Vec<Span>, AgentError> {
        self.move_cursor_with(position, |spans| spans.collect())
    }

    /// カーソル位置に依存するスパンを問い合わせ、クロージャで消費する
    ///
    /// テキストは再送しない。結果は封筒なしの `SpanCollection`。
    ///
    /// # エラー
    /// - `AgentError::Unsupported`: 契約に `moveCursor` がない
    /// - `AgentError::NoDocument`: まだ全文更新をしていない
    /// - `AgentError::CursorOutOfRange`: 位置がテキストの外
    pub fn move_cursor_with<R>(
        &mut self,
        position: u32,
        f: impl FnOnce(SpansWithin<'_>) -> Result<R, ViewError>,
    ) -> Result<R, AgentError> {
        let contract = self.contract;
        let export = contract.move_cursor.ok_or(AgentError::Unsupported {
            export: "moveCursor",
            version: contract.version,
        })?;
        let text_len = self.document_len.ok_or(AgentError::NoDocument)?;
        if position > text_len {
            return Err(AgentError::CursorOutOfRange { position, text_len });
        }

        let generation = self.module.memory().generation();
        let result = self.module.call(export.name, &[position])?;
        self.stats.cursor_moves += 1;
        self.note_generation(generation, export.name);

        log::debug!("{}({}) -> {}", export.name, position, result);

        self.decode(ResultShape::Collection, result, text_len, f)
    }

    /// 呼び出しが戻った後の新しいスナップショットで結果をデコードする
    fn decode<R>(
        &self,
        shape: ResultShape,
        address: u32,
        text_len: u32,
        f: impl FnOnce(SpansWithin<'_>) -> Result<R, ViewError>,
    ) -> Result<R, AgentError> {
        let decoded = self.module.memory().with_snapshot(|snapshot| {
            let collection = shape.decode(snapshot, address)?;
            f(collection.spans_within(text_len)?)
        });
        Ok(decoded?)
    }

    fn note_generation(&mut self, before: u64, export: &str) {
        let after = self.module.memory().generation();
        if after != before {
            self.stats.growths += 1;
            log::debug!(
                "linear memory changed during {} (generation {} -> {}, now {} bytes)",
                export,
                before,
                after,
                self.module.memory().byte_len()
            );
        }
    }
}
