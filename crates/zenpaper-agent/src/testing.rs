//! ユニットテスト用の台本どおりに動くモジュール

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use zenpaper_memory::{HostMemory, LinearMemory};

use crate::error::ModuleError;
use crate::module::AnalysisModule;

/// 入力テキストの書き込み先
pub(crate) const INPUT_AT: u32 = 64;

/// `(tag, start, end)`
pub(crate) type RawSpan = (u8, u32, u32);

/// 返すスパンをあらかじめ決めておくフェイク
///
/// 結果は入力の直後に `[SpanCollection][Span...]` として書く。
/// `UpdateResult` は `SpanCollection` と同じバイト列なので、
/// 封筒の有無にかかわらず同じレイアウトで読める。
pub(crate) struct ScriptedModule {
    pub memory: HostMemory,
    /// 全文更新の結果（`None` ならアドレス 0 を返す）
    pub update_spans: Option<Vec<RawSpan>>,
    /// カーソル移動の結果（`None` ならアドレス 0 を返す）
    pub cursor_spans: Option<Vec<RawSpan>>,
    /// 呼ばれたエクスポートと引数
    pub calls: Vec<(String, Vec<u32>)>,
    /// `startUpdate` のたびにこのバイト数だけメモリを成長させる
    pub grow_on_start: usize,
    /// 結果の `SpanCollection.ptr` を強制的に 0 にする
    pub null_pointer: bool,
    /// このエクスポートが呼ばれたら trap する
    pub trap_on: Option<&'static str>,
    exports: Vec<(&'static str, u32)>,
    last_len: u32,
}

impl ScriptedModule {
    pub fn incremental(memory_len: usize) -> Self {
        Self::with_exports(
            memory_len,
            vec![("startUpdate", 1), ("endUpdate", 0), ("moveCursor", 1)],
        )
    }

    pub fn with_exports(memory_len: usize, exports: Vec<(&'static str, u32)>) -> Self {
        ScriptedModule {
            memory: HostMemory::new(memory_len),
            update_spans: Some(Vec::new()),
            cursor_spans: Some(Vec::new()),
            calls: Vec::new(),
            grow_on_start: 0,
            null_pointer: false,
            trap_on: None,
            exports,
            last_len: 0,
        }
    }

    pub fn call_names(&self) -> Vec<&str> {
        self.calls.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn write_result(&mut self, spans: Option<Vec<RawSpan>>) -> u32 {
        let spans = match spans {
            Some(spans) => spans,
            None => return 0,
        };
        let result_at = INPUT_AT + self.last_len + 8;
        let spans_at = result_at + 8;
        let needed = (spans_at as usize) + spans.len() * 9;
        if needed > self.memory.byte_len() {
            let extra = needed - self.memory.byte_len();
            self.memory.grow(extra).unwrap();
        }

        let bytes = self.memory.bytes_mut();
        let ptr = if self.null_pointer { 0 } else { spans_at };
        let at = result_at as usize;
        bytes[at..at + 4].copy_from_slice(&ptr.to_le_bytes());
        bytes[at + 4..at + 8].copy_from_slice(&(spans.len() as u32).to_le_bytes());
        for (i, (tag, start, end)) in spans.iter().enumerate() {
            let at = spans_at as usize + i * 9;
            bytes[at] = *tag;
            bytes[at + 1..at + 5].copy_from_slice(&start.to_le_bytes());
            bytes[at + 5..at + 9].copy_from_slice(&end.to_le_bytes());
        }
        result_at
    }
}

impl AnalysisModule for ScriptedModule {
    type Memory = HostMemory;

    fn memory(&self) -> &HostMemory {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut HostMemory {
        &mut self.memory
    }

    fn export_arity(&self, name: &str) -> Option<u32> {
        self.exports
            .iter()
            .find(|(export, _)| *export == name)
            .map(|(_, arity)| *arity)
    }

    fn call(&mut self, name: &str, args: &[u32]) -> Result<u32, ModuleError> {
        self.calls.push((name.to_string(), args.to_vec()));
        if self.trap_on == Some(name) {
            return Err(ModuleError::Trap {
                export: name.to_string(),
                message: "unreachable".to_string(),
            });
        }
        match name {
            "startUpdate" | "startDocumentUpdate" => {
                self.last_len = args[0];
                let needed = INPUT_AT as usize + args[0] as usize;
                let mut grow = self.grow_on_start;
                if needed > self.memory.byte_len() {
                    grow += needed - self.memory.byte_len();
                }
                if grow > 0 {
                    self.memory.grow(grow).unwrap();
                }
                Ok(INPUT_AT)
            }
            "endUpdate" | "endDocumentUpdate" => {
                let spans = self.update_spans.clone();
                Ok(self.write_result(spans))
            }
            "moveCursor" => {
                let spans = self.cursor_spans.clone();
                Ok(self.write_result(spans))
            }
            _ => Err(ModuleError::NotCallable(name.to_string())),
        }
    }
}
