//! ZenpaperAgent wasm-bindgen エクスポート
//!
//! エディタから呼び出すハイライトの主エントリポイント。
//! モジュールの取得・インスタンス化（非同期）と、起動後の同期呼び出しを統合する。

use alloc::format;
use alloc::string::String;

use serde::Serialize;
use js_sys::{Object, Reflect, WebAssembly};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use zenpaper_agent::{
    AgentConfig, BootError, EditorUpdate, HighlightMode, Highlighter, LogCapability, ProtocolVersion,
    WasmAgent,
};
use zenpaper_schema::{IMPORT_MODULE, MEMORY_IMPORT};

use crate::memory::JsMemory;
use crate::module::JsModule;
use crate::offset::{to_editor_units, Utf16Offsets};
use crate::{decorations_json, ConsoleSink};

/// 起動済みの解析モジュール + ハイライト状態
///
/// ## 内部アーキテクチャ
///
/// ```text
/// ZenpaperAgent
///   └── Highlighter   (zenpaper-agent) - 全文層 / カーソル層の状態機械
///         └── WasmAgent (zenpaper-agent) - 契約照合済みのアダプタ
///               └── JsModule - WebAssembly.Instance + JsMemory + log クロージャ
/// ```
///
/// ## スレッド安全性
///
/// WASM はシングルスレッドのため、`!Send + !Sync` を満たす。
/// JS からは単一スレッドで呼び出される前提。
///
/// ## 位置の単位
///
/// JS との受け渡しは UTF-16 のコード単位、モジュールとの受け渡しは
/// UTF-8 のバイトオフセット。変換表は送信したテキストごとに作り直す。
#[wasm_bindgen]
pub struct ZenpaperAgent {
    highlighter: Highlighter<JsModule>,
    offsets: Utf16Offsets,
}

#[wasm_bindgen]
impl ZenpaperAgent {
    /// 解析モジュールを取得・インスタンス化して起動する
    ///
    /// # 引数
    /// - `url`: 解析モジュール（.wasm）の URL
    /// - `initial_pages`: 共有メモリの初期ページ数。省略時は 32（2 MiB）
    /// - `protocol`: プロトコル世代（1〜3）。省略時は最新
    ///
    /// # エラー
    /// - 取得・コンパイル・インスタンス化の失敗
    /// - 契約のエクスポートがない、引数の数が違う
    ///
    /// いずれもエディタ側では回復可能（ハイライトなしで続行する）。
    ///
    /// # 例（TypeScript）
    /// ```typescript
    /// const agent = await ZenpaperAgent.init("/zenpaper.wasm");
    /// const agent2 = await ZenpaperAgent.init("/zenpaper.wasm", 64); // 4 MiB
    /// ```
    pub async fn init(
        url: String,
        initial_pages: Option<u32>,
        protocol: Option<u32>,
    ) -> Result<ZenpaperAgent, JsError> {
        let mut config = AgentConfig::default();
        if let Some(pages) = initial_pages {
            config.initial_pages = pages;
        }
        if let Some(version) = protocol {
            config.protocol = ProtocolVersion::try_from(version)
                .map_err(|_| JsError::new(&format!("Unknown protocol version: {}", version)))?;
        }

        let agent = boot(&url, &config)
            .await
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        let highlighter = Highlighter::new(agent, "").map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(ZenpaperAgent {
            highlighter,
            offsets: Utf16Offsets::default(),
        })
    }

    /// テキスト全体を送信し、装飾 JSON を返す
    ///
    /// # 戻り値
    /// `[{ "start": 2, "end": 7, "class": "zp-chord" }, ...]`（UTF-16 のコード単位）
    ///
    /// # エラー
    /// - モジュールの trap、プロトコル違反（装飾は空になる）
    #[wasm_bindgen(js_name = "updateDocument")]
    pub fn update_document(&mut self, text: &str) -> Result<String, JsError> {
        self.offsets = Utf16Offsets::new(text);
        self.highlighter
            .on_text_changed(text)
            .map_err(|e| JsError::new(&format!("Update failed: {}", e)))?;
        self.decorations()
    }

    /// カーソル位置（UTF-16 のコード単位）を通知し、装飾 JSON を返す
    #[wasm_bindgen(js_name = "moveCursor")]
    pub fn move_cursor(&mut self, position: u32) -> Result<String, JsError> {
        self.highlighter
            .on_selection_changed(self.offsets.to_byte(position))
            .map_err(|e| JsError::new(&format!("Cursor move failed: {}", e)))?;
        self.decorations()
    }

    /// EditorView の update をそのまま渡す
    ///
    /// `doc_changed` が true なら `text` を送信し、選択の変化は無視する。
    /// `head` は UTF-16 のコード単位。
    #[wasm_bindgen(js_name = "onUpdate")]
    pub fn on_update(
        &mut self,
        doc_changed: bool,
        text: &str,
        selection_set: bool,
        head: u32,
    ) -> Result<String, JsError> {
        if doc_changed {
            self.offsets = Utf16Offsets::new(text);
        }
        let update = EditorUpdate {
            text: doc_changed.then_some(text),
            cursor: selection_set.then(|| self.offsets.to_byte(head)),
        };
        self.highlighter
            .on_update(update)
            .map_err(|e| JsError::new(&format!("Highlight failed: {}", e)))?;
        self.decorations()
    }

    /// 現在の装飾 JSON（位置は UTF-16 のコード単位）
    pub fn decorations(&self) -> Result<String, JsError> {
        decorations_json(&to_editor_units(&self.highlighter.decorations(), &self.offsets))
            .map_err(|e| JsError::new(&format!("Serialization failed: {}", e)))
    }

    /// 最後の更新がカーソル移動だったか
    #[wasm_bindgen(getter, js_name = "cursorMode")]
    pub fn cursor_mode(&self) -> bool {
        self.highlighter.mode() == HighlightMode::Cursor
    }

    /// 呼び出し統計（JSON）
    ///
    /// `{ "updates": 3, "cursorMoves": 5, "growths": 1 }`
    pub fn stats(&self) -> Result<String, JsError> {
        let stats = self.highlighter.agent().stats();
        serde_json::to_string(&StatsJson {
            updates: stats.updates,
            cursor_moves: stats.cursor_moves,
            growths: stats.growths,
        })
        .map_err(|e| JsError::new(&format!("Serialization failed: {}", e)))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsJson {
    updates: u64,
    cursor_moves: u64,
    growths: u64,
}

/// モジュールを作り、契約を照合する
async fn boot(url: &str, config: &AgentConfig) -> Result<WasmAgent<JsModule>, BootError> {
    let module = instantiate(url, config)
        .await
        .map_err(|e| BootError::Instantiate(format!("{:?}", e)))?;
    WasmAgent::boot(module, config)
}

/// `fetch` + `WebAssembly.instantiateStreaming` でモジュールを作る
///
/// import は `env.memory`（ホストが確保した共有メモリ）と、
/// 世代ごとの名前を持つログ関数の 2 つ。
async fn instantiate(url: &str, config: &AgentConfig) -> Result<JsModule, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let contract = config.protocol.contract();

    let memory = JsMemory::new(config.initial_pages, config.max_pages)?;

    let log_memory = memory.clone();
    let mut capability = LogCapability::new(ConsoleSink);
    let log = Closure::<dyn FnMut(u32, u32)>::new(move |address: u32, length: u32| {
        capability.deliver(&log_memory, address, length);
    });

    let env = Object::new();
    Reflect::set(&env, &MEMORY_IMPORT.into(), memory.as_js())?;
    Reflect::set(&env, &contract.log_import.into(), log.as_ref())?;
    let imports = Object::new();
    Reflect::set(&imports, &IMPORT_MODULE.into(), &env)?;

    let response = window.fetch_with_str(url);
    let source = JsFuture::from(WebAssembly::instantiate_streaming(&response, &imports)).await?;
    let instance: WebAssembly::Instance = Reflect::get(&source, &"instance".into())?.dyn_into()?;

    log::debug!(
        "instantiated {} with {} initial pages, log import {}.{}",
        url,
        config.initial_pages,
        IMPORT_MODULE,
        contract.log_import
    );

    Ok(JsModule::new(instance.exports(), memory, log))
}
