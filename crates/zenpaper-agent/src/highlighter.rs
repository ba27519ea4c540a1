//! エディタのイベントとアダプタを結ぶハイライト状態機械
//!
//! ## 状態遷移
//!
//! ```text
//! テキスト変更 ──▶ Full   : 全文を再分類。カーソル層は破棄
//! 選択変更     ──▶ Cursor : moveCursor を毎回問い合わせる（キャッシュしない）
//! 両方同時     ──▶ Full   : テキスト変更が優先
//! ```
//!
//! どちらの状態も同じ `Span` の列を作り、`decorations_for` に渡される。

use alloc::vec::Vec;

use zenpaper_schema::Span;

use crate::agent::WasmAgent;
use crate::decoration::{decorations_for, Decoration};
use crate::error::AgentError;
use crate::module::AnalysisModule;

/// 最後に適用した更新の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightMode {
    /// 全文更新
    Full,
    /// カーソル移動
    Cursor,
}

/// エディタからの 1 回分の更新通知
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorUpdate<'t> {
    /// テキストが変わった場合の新しい全文
    pub text: Option<&'t str>,
    /// 選択が変わった場合のカーソル位置（バイトオフセット）
    pub cursor: Option<u32>,
}

/// ハイライト状態機械
///
/// 起動済みの `WasmAgent` からしか作れないので、起動前の状態で
/// ハイライトが表示されることはない。
pub struct Highlighter<M: AnalysisModule> {
    agent: WasmAgent<M>,
    mode: HighlightMode,
    /// 最後の全文更新のスパン
    document: Vec<Span>,
    /// 最後のカーソル移動のスパン
    cursor: Vec<Span>,
}

impl<M: AnalysisModule> Highlighter<M> {
    /// 初期テキストを送信してハイライトを始める
    pub fn new(agent: WasmAgent<M>, text: &str) -> Result<Self, AgentError> {
        let mut highlighter = Highlighter {
            agent,
            mode: HighlightMode::Full,
            document: Vec::new(),
            cursor: Vec::new(),
        };
        highlighter.on_text_changed(text)?;
        Ok(highlighter)
    }

    pub fn mode(&self) -> HighlightMode {
        self.mode
    }

    pub fn agent(&self) -> &WasmAgent<M> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut WasmAgent<M> {
        &mut self.agent
    }

    /// テキスト変更: 全文を再分類する
    ///
    /// 失敗した場合はどちらの層も空になる（古いテキストのスパンは使わない）。
    pub fn on_text_changed(&mut self, text: &str) -> Result<(), AgentError> {
        self.mode = HighlightMode::Full;
        self.cursor.clear();
        self.document.clear();
        self.document = self.agent.update_document(text)?;
        Ok(())
    }

    /// 選択変更: カーソル依存のスパンを問い合わせる
    ///
    /// `moveCursor` を持たない世代では何もしない。
    pub fn on_selection_changed(&mut self, position: u32) -> Result<(), AgentError> {
        if !self.agent.supports_cursor() {
            return Ok(());
        }
        self.mode = HighlightMode::Cursor;
        self.cursor.clear();
        self.cursor = self.agent.move_cursor(position)?;
        Ok(())
    }

    /// エディタの更新通知を振り分ける
    pub fn on_update(&mut self, update: EditorUpdate<'_>) -> Result<(), AgentError> {
        match update {
            EditorUpdate { text: Some(text), .. } => self.on_text_changed(text),
            EditorUpdate { text: None, cursor: Some(position) } => self.on_selection_changed(position),
            EditorUpdate { text: None, cursor: None } => Ok(()),
        }
    }

    /// 現在の装飾（全文層 + カーソル層）
    pub fn decorations(&self) -> Vec<Decoration> {
        decorations_for(self.document.iter().chain(self.cursor.iter()).copied())
    }
}
