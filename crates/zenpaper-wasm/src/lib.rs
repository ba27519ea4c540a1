//! # zenpaper-wasm
//!
//! wasm-bindgen エクスポート：エディタのフロントエンドから呼び出す公開 API。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { ZenpaperAgent, init_panic_hook, initLogging } from '../zenpaper-wasm-pkg/zenpaper_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//! initLogging("debug");
//!
//! // 解析モジュールを取得・インスタンス化（失敗してもエディタは動き続ける）
//! const agent = await ZenpaperAgent.init("/zenpaper.wasm");
//!
//! // EditorView の update リスナーから呼ぶ
//! // 位置はエディタと同じ UTF-16 のコード単位で受け渡す（バイトへの変換は内部で行う）
//! const json = agent.onUpdate(update.docChanged, doc.toString(), update.selectionSet, head);
//! for (const { start, end, class: cls } of JSON.parse(json)) {
//!     builder.add(start, end, Decoration.mark({ class: cls }));
//! }
//! ```

extern crate alloc;

use alloc::string::String;

use wasm_bindgen::prelude::*;
use zenpaper_agent::{Decoration, LogSink};

pub mod agent;
pub mod memory;
pub mod module;
pub mod offset;

pub use agent::ZenpaperAgent;
pub use memory::JsMemory;
pub use module::JsModule;
pub use offset::Utf16Offsets;

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `log` ファサードの出力をブラウザコンソールに流す
///
/// # 引数
/// - `level`: `"error"` / `"warn"` / `"info"` / `"debug"` / `"trace"` / `"off"`。省略時は `"info"`。
///
/// 2 回目以降の呼び出しはレベルだけを変更する。
#[wasm_bindgen(js_name = "initLogging")]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let filter = parse_level(level.as_deref())?;
    // 既に登録済みなら Err が返るが、同じロガーなので無視してよい
    let _ = log::set_logger(&CONSOLE_LOGGER);
    log::set_max_level(filter);
    Ok(())
}

fn parse_level(level: Option<&str>) -> Result<log::LevelFilter, JsError> {
    level
        .unwrap_or("info")
        .parse()
        .map_err(|_| JsError::new(&alloc::format!("Unknown log level: {:?}", level)))
}

/// 装飾の列をフロントエンド向けの JSON にする
///
/// `[{ "start": 2, "end": 7, "class": "zp-chord" }, ...]`
pub fn decorations_json(decorations: &[Decoration]) -> Result<String, serde_json::Error> {
    serde_json::to_string(decorations)
}

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

/// `web_sys::console` に書く `log::Log` 実装
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&alloc::format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// 解析モジュールの診断メッセージをそのまま `console.log` に出すシンク
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn emit(&mut self, message: &str) {
        web_sys::console::log_1(&JsValue::from_str(message));
    }
}
