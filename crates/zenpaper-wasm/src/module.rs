//! `WebAssembly.Instance` のエクスポートを解析モジュールとして扱う

use alloc::format;
use alloc::string::ToString;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use zenpaper_agent::{AnalysisModule, ModuleError};

use crate::memory::JsMemory;

/// インスタンス化済みのモジュール
///
/// ログ import のクロージャはモジュールが生きている間ずっと呼ばれうるので、
/// ここで所有して一緒に破棄する。
pub struct JsModule {
    exports: Object,
    memory: JsMemory,
    _log: Closure<dyn FnMut(u32, u32)>,
}

impl JsModule {
    pub fn new(exports: Object, memory: JsMemory, log: Closure<dyn FnMut(u32, u32)>) -> Self {
        JsModule {
            exports,
            memory,
            _log: log,
        }
    }

    fn function(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.exports, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }
}

impl AnalysisModule for JsModule {
    type Memory = JsMemory;

    fn memory(&self) -> &JsMemory {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut JsMemory {
        &mut self.memory
    }

    fn export_arity(&self, name: &str) -> Option<u32> {
        self.function(name).map(|f| f.length())
    }

    fn call(&mut self, name: &str, args: &[u32]) -> Result<u32, ModuleError> {
        let function = self
            .function(name)
            .ok_or_else(|| ModuleError::NotCallable(name.to_string()))?;

        let js_args: Array = args.iter().map(|&arg| JsValue::from(arg)).collect();
        let value = function
            .apply(&JsValue::NULL, &js_args)
            .map_err(|e| ModuleError::Trap {
                export: name.to_string(),
                message: format!("{:?}", e),
            })?;

        value.as_f64().and_then(to_address).ok_or_else(|| ModuleError::BadReturn {
            export: name.to_string(),
        })
    }
}

/// i32 の戻り値をアドレスにする
///
/// 2 GiB を超えるアドレスは JS では負の数として見えるので、ビット列として解釈し直す。
fn to_address(number: f64) -> Option<u32> {
    if number.fract() != 0.0 || number < i32::MIN as f64 || number > u32::MAX as f64 {
        return None;
    }
    Some(number as i64 as u32)
}
