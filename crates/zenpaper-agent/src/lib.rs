//! # zenpaper-agent
//!
//! サンドボックス化された解析モジュールのホスト側アダプタ。
//!
//! ## 概要
//!
//! 解析モジュールは楽譜テキストを受け取り、ハイライト用のスパン
//! `(tag, start, end)` を自分の線形メモリに書いて返す。
//! このクレートはその呼び出し契約をホスト側から駆動する。
//!
//! ### キーコンセプト
//!
//! - **契約**: プロトコル世代ごとのエクスポート名と引数の数。起動時に 1 回だけ照合する
//! - **全文更新**: `startUpdate(len)` → テキスト書き込み → `endUpdate()`
//! - **カーソル移動**: `moveCursor(position)`。テキストは再送しない
//! - **ログ能力**: モジュールが呼ぶ唯一の host import。インスタンス化時に注入する
//! - **装飾**: タグを表示スタイルに写像したもの
//!
//! ## 状態遷移
//!
//! ```text
//! Unloaded → Booting (モジュール取得・インスタンス化)
//!          → Ready   (契約照合に成功、WasmAgent が存在する)
//! ```
//!
//! `Booting` は非同期なので zenpaper-wasm 側にある。
//! このクレートでは `WasmAgent` の値が存在すること自体が `Ready` を意味する。

#![no_std]
extern crate alloc;

pub mod agent;
pub mod capability;
pub mod decoration;
pub mod error;
pub mod highlighter;
pub mod module;

#[cfg(test)]
mod testing;

pub use agent::{AgentStats, WasmAgent};
pub use capability::{decode_log_message, BufferedSink, LogCapability, LogForwarder, LogSink};
pub use decoration::{decorations_for, Decoration, VisualClass};
pub use error::{AgentError, BootError, ModuleError};
pub use highlighter::{EditorUpdate, HighlightMode, Highlighter};
pub use module::AnalysisModule;

pub use zenpaper_memory::DEFAULT_INITIAL_PAGES;
pub use zenpaper_schema::ProtocolVersion;

/// アダプタの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// 照合するプロトコル世代
    pub protocol: ProtocolVersion,
    /// 共有メモリの初期ページ数（1 ページ = 64 KiB）
    pub initial_pages: u32,
    /// 共有メモリの最大ページ数（`None` なら無制限）
    pub max_pages: Option<u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            protocol: ProtocolVersion::LATEST,
            initial_pages: DEFAULT_INITIAL_PAGES,
            max_pages: None,
        }
    }
}
