//! zenpaper-agent エラー型

use alloc::string::String;

use thiserror::Error;
use zenpaper_memory::MemoryError;
use zenpaper_schema::ProtocolVersion;
use zenpaper_view::ViewError;

/// モジュール呼び出しそのものの失敗（trap など）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// エクスポートの実行中に trap した
    #[error("Module trapped in {export}: {message}")]
    Trap { export: String, message: String },
    /// エクスポートが存在しないか関数ではない
    #[error("Export {0} is not callable")]
    NotCallable(String),
    /// 戻り値がアドレス（u32）として解釈できない
    #[error("Export {export} returned a non-address value")]
    BadReturn { export: String },
}

/// 起動（契約の照合・インスタンス化）の失敗
///
/// アプリケーションとしては回復可能。エディタはハイライトなしで動き続ける。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootError {
    /// 契約にあるエクスポートが見つからない
    #[error("Module does not export {name}")]
    MissingExport { name: &'static str },
    /// 引数の数が契約と違う
    #[error("Export {name} takes {found} parameters, expected {expected}")]
    ArityMismatch {
        name: &'static str,
        expected: u32,
        found: u32,
    },
    /// 取得・コンパイル・インスタンス化の失敗
    #[error("Module instantiation failed: {0}")]
    Instantiate(String),
}

/// アダプタ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error(transparent)]
    Boot(#[from] BootError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    /// 入力テキストの書き込み失敗（モジュールが返した領域が足りない）
    #[error("Writing input failed: {0}")]
    Memory(#[from] MemoryError),
    /// 結果のデコード中のプロトコル違反
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ViewError),
    /// テキストが u32 で表せる長さを超えている
    #[error("Text of {len} bytes is too long for a 32-bit address space")]
    TextTooLong { len: usize },
    /// この世代の契約にないエントリポイント
    #[error("{export} is not part of protocol {version:?}")]
    Unsupported {
        export: &'static str,
        version: ProtocolVersion,
    },
    /// 全文更新の前にカーソル移動が呼ばれた
    #[error("No document has been submitted yet")]
    NoDocument,
    /// カーソル位置がテキストの外
    #[error("Cursor position {position} is outside the document of {text_len} bytes")]
    CursorOutOfRange { position: u32, text_len: u32 },
}
