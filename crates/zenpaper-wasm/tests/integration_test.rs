//! zenpaper-wasm 統合テスト
//!
//! memory + view + schema + agent の完全なパイプラインをテストする。
//! 解析モジュールは HostMemory の上で動くネイティブのトークナイザで代用する。

use proptest::prelude::*;

use zenpaper_agent::{
    AgentConfig, BufferedSink, EditorUpdate, Highlighter, LogCapability, WasmAgent,
};
use zenpaper_agent::{AnalysisModule, ModuleError};
use zenpaper_memory::{HostMemory, LinearMemory};
use zenpaper_schema::{HighlightTag, Span};

// ==============================================================
// ヘルパー: 楽譜テキストを分類するフェイク解析モジュール
// ==============================================================

/// ログメッセージの書き込み先
const LOG_AT: u32 = 16;

/// 入力テキストの書き込み先
const INPUT_AT: u32 = 1024;

/// 数字の連続を和音（tag 1）、`;` から行末をコメント（tag 0）として分類する
///
/// 結果は入力の直後（8 バイト境界）に `[UpdateResult][Span...]` として書く。
/// `moveCursor` はカーソル位置の和音と同じ綴りの和音をすべて
/// 依存参照（tag 2）として返す。
struct Tokenizer {
    memory: HostMemory,
    log: LogCapability,
    /// 最後の `startUpdate` の長さ
    input_len: u32,
    /// 最後の `endUpdate` で分類したトークン
    tokens: Vec<(u8, u32, u32)>,
    /// `startUpdate` の呼び出し回数
    starts: u32,
    /// 結果を書く直前にバッファを再配置する
    relocate_before_result: bool,
}

impl Tokenizer {
    fn new(memory_len: usize, sink: BufferedSink) -> Self {
        Tokenizer {
            memory: HostMemory::new(memory_len),
            log: LogCapability::new(sink),
            input_len: 0,
            tokens: Vec::new(),
            starts: 0,
            relocate_before_result: false,
        }
    }

    fn ensure_len(&mut self, needed: usize) {
        let len = self.memory.byte_len();
        if needed > len {
            // 4 KiB 単位で成長させる
            let additional = (needed - len).div_ceil(4096) * 4096;
            self.memory.grow(additional).unwrap();
        }
    }

    /// モジュールから `log(address, length)` を呼ぶ
    fn console_log(&mut self, message: &str) {
        self.memory.write(LOG_AT, message.as_bytes()).unwrap();
        self.log.deliver(&self.memory, LOG_AT, message.len() as u32);
    }

    fn result_at(&self) -> u32 {
        (INPUT_AT + self.input_len + 7) & !7
    }

    /// `[ptr, len][Span...]` を `at` に書き、`at` を返す
    fn write_collection(&mut self, at: u32, spans: &[(u8, u32, u32)]) -> u32 {
        let spans_at = at + 8;
        self.ensure_len(spans_at as usize + spans.len() * 9);
        if self.relocate_before_result {
            self.memory.relocate();
        }

        let ptr = if spans.is_empty() { 0 } else { spans_at };
        let mut bytes = Vec::with_capacity(8 + spans.len() * 9);
        bytes.extend_from_slice(&ptr.to_le_bytes());
        bytes.extend_from_slice(&(spans.len() as u32).to_le_bytes());
        for &(tag, start, end) in spans {
            bytes.push(tag);
            bytes.extend_from_slice(&start.to_le_bytes());
            bytes.extend_from_slice(&end.to_le_bytes());
        }
        self.memory.write(at, &bytes).unwrap();
        at
    }

    fn end_update(&mut self) -> u32 {
        let text = self.memory.read(INPUT_AT, self.input_len).unwrap();
        self.tokens = tokenize(&text);
        let message = format!("classified {} tokens", self.tokens.len());
        self.console_log(&message);

        if self.tokens.is_empty() {
            return 0;
        }
        let tokens = self.tokens.clone();
        self.write_collection(self.result_at(), &tokens)
    }

    fn move_cursor(&mut self, position: u32) -> u32 {
        let text = self.memory.read(INPUT_AT, self.input_len).unwrap();
        let word = |start: u32, end: u32| &text[start as usize..end as usize];

        let references: Vec<(u8, u32, u32)> = match self
            .tokens
            .iter()
            .find(|&&(tag, start, end)| tag == 1 && start <= position && position <= end)
        {
            Some(&(_, start, end)) => self
                .tokens
                .iter()
                .filter(|&&(tag, s, e)| tag == 1 && word(s, e) == word(start, end))
                .map(|&(_, s, e)| (2, s, e))
                .collect(),
            None => Vec::new(),
        };

        // 全文更新の結果の後ろに置く
        let at = (self.result_at() + 8 + self.tokens.len() as u32 * 9 + 7) & !7;
        self.write_collection(at, &references)
    }
}

impl AnalysisModule for Tokenizer {
    type Memory = HostMemory;

    fn memory(&self) -> &HostMemory {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut HostMemory {
        &mut self.memory
    }

    fn export_arity(&self, name: &str) -> Option<u32> {
        match name {
            "startUpdate" | "moveCursor" => Some(1),
            "endUpdate" => Some(0),
            _ => None,
        }
    }

    fn call(&mut self, name: &str, args: &[u32]) -> Result<u32, ModuleError> {
        match name {
            "startUpdate" => {
                self.starts += 1;
                self.input_len = args[0];
                self.ensure_len((INPUT_AT + args[0]) as usize);
                Ok(INPUT_AT)
            }
            "endUpdate" => Ok(self.end_update()),
            "moveCursor" => Ok(self.move_cursor(args[0])),
            _ => Err(ModuleError::NotCallable(name.to_string())),
        }
    }
}

fn tokenize(text: &[u8]) -> Vec<(u8, u32, u32)> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let start = i;
        if text[i] == b';' {
            while i < text.len() && text[i] != b'\n' {
                i += 1;
            }
            tokens.push((0, start as u32, i as u32));
        } else if text[i].is_ascii_digit() {
            while i < text.len() && text[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push((1, start as u32, i as u32));
        } else {
            i += 1;
        }
    }
    tokens
}

fn boot(memory_len: usize) -> (WasmAgent<Tokenizer>, BufferedSink) {
    let sink = BufferedSink::new();
    let module = Tokenizer::new(memory_len, sink.clone());
    let agent = WasmAgent::boot(module, &AgentConfig::default()).unwrap();
    (agent, sink)
}

fn chord(start: u32, end: u32) -> Span {
    Span { tag: HighlightTag::Chord, start, end }
}

// ==============================================================
// テスト
// ==============================================================

/// 空のテキスト → endUpdate が 0 → スパンなし
#[test]
fn test_empty_text_has_no_spans() {
    let (mut agent, _) = boot(4096);
    let spans = agent.update_document("").unwrap();
    assert!(spans.is_empty());
    assert_eq!(agent.document_len(), Some(0));
}

/// 5 バイトの和音 1 つ
#[test]
fn test_single_chord_token() {
    let (mut agent, _) = boot(4096);
    let spans = agent.update_document("  13579 ").unwrap();
    assert_eq!(spans, vec![chord(2, 7)]);
}

/// カーソル移動はテキストを再送せずに SpanCollection を返す
#[test]
fn test_cursor_move_after_update() {
    let (mut agent, _) = boot(4096);
    agent.update_document("  13579 ").unwrap();

    let spans = agent.move_cursor(3).unwrap();
    assert_eq!(
        spans,
        vec![Span { tag: HighlightTag::DependencyReference, start: 2, end: 7 }]
    );
    assert_eq!(agent.module().starts, 1, "startUpdate が再度呼ばれた");
}

/// 初期容量を超えるテキスト → モジュールがメモリを成長させる
#[test]
fn test_text_larger_than_initial_memory() {
    let (mut agent, _) = boot(2048);
    let text = "135 ; ii\n".repeat(223);
    let text = &text[..2000];
    assert_eq!(text.len(), 2000);

    let spans = agent.update_document(text).unwrap();
    assert!(agent.module().memory().byte_len() > 2048);
    assert!(agent.stats().growths >= 1);
    assert_eq!(spans.len(), tokenize(text.as_bytes()).len());
    for span in &spans {
        assert!(span.start <= span.end && span.end <= 2000, "範囲外: {:?}", span);
    }
    assert_eq!(spans[0], chord(0, 3));
    assert_eq!(spans[1], Span { tag: HighlightTag::Comment, start: 4, end: 8 });
}

/// 結果を書く直前に再配置されても、デコードは新しいバッファを読む
#[test]
fn test_relocation_before_decode() {
    let (mut agent, _) = boot(4096);
    agent.module_mut().relocate_before_result = true;
    let before = agent.module().memory().generation();

    let spans = agent.update_document("1 22 333").unwrap();
    assert_ne!(agent.module().memory().generation(), before);
    assert_eq!(agent.stats().growths, 1);
    assert_eq!(spans, vec![chord(0, 1), chord(2, 4), chord(5, 8)]);
}

/// 同じテキストを 2 回送ると同じスパンになる
#[test]
fn test_update_is_deterministic() {
    let (mut agent, _) = boot(4096);
    let text = "; intro\n1 3 5 ; tonic\n135";
    let first = agent.update_document(text).unwrap();
    let second = agent.update_document(text).unwrap();
    assert_eq!(first, second);
    assert_eq!(agent.stats().updates, 2);
}

/// 更新を挟まない同じカーソル位置は同じ結果になる
#[test]
fn test_cursor_is_idempotent() {
    let (mut agent, _) = boot(4096);
    agent.update_document("13 5 13 ; 13").unwrap();
    let first = agent.move_cursor(1).unwrap();
    let second = agent.move_cursor(1).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2, "コメント内の 13 は参照に含まれない");
}

/// カーソルが和音の外ならスパンなし（ptr = 0, len = 0）
#[test]
fn test_cursor_outside_chord() {
    let (mut agent, _) = boot(4096);
    agent.update_document("13   5").unwrap();
    assert!(agent.move_cursor(4).unwrap().is_empty());
    // 終端は有効な位置
    assert_eq!(agent.move_cursor(6).unwrap().len(), 1);
}

/// モジュールの log 呼び出しはシンクに届く
#[test]
fn test_module_log_reaches_sink() {
    let (mut agent, sink) = boot(4096);
    agent.update_document("1 2 ; x").unwrap();
    agent.update_document("").unwrap();
    assert_eq!(sink.take(), ["classified 3 tokens", "classified 0 tokens"]);
}

/// テキスト編集 → 選択変更 → 装飾 JSON
#[test]
fn test_highlighter_to_decoration_json() {
    let (agent, _) = boot(4096);
    let mut highlighter = Highlighter::new(agent, "15 ; x\n15").unwrap();

    let json = zenpaper_wasm::decorations_json(&highlighter.decorations()).unwrap();
    assert_eq!(
        json,
        r#"[{"start":0,"end":2,"class":"zp-chord"},{"start":3,"end":6,"class":"zp-comment"},{"start":7,"end":9,"class":"zp-chord"}]"#
    );

    highlighter
        .on_update(EditorUpdate { text: None, cursor: Some(8) })
        .unwrap();
    let decorations = highlighter.decorations();
    assert_eq!(decorations.len(), 5);

    // テキストが変わればカーソル層は消える
    highlighter
        .on_update(EditorUpdate { text: Some("15 ; x\n15 "), cursor: Some(10) })
        .unwrap();
    assert_eq!(highlighter.decorations().len(), 3);
}

/// 任意の入力を壊さないことのチェック
#[test]
fn test_non_ascii_text() {
    let (mut agent, _) = boot(4096);
    let text = "和音 135 ; コメント";
    let spans = agent.update_document(text).unwrap();
    assert_eq!(spans[0], chord(7, 10));
    assert_eq!(spans[1].end as usize, text.len());
}

/// エディタの位置（UTF-16）とモジュールの位置（バイト）の往復
#[test]
fn test_editor_positions_are_utf16() {
    use zenpaper_wasm::offset::to_editor_units;
    use zenpaper_wasm::Utf16Offsets;

    let text = "和音 135 ; コメント";
    let offsets = Utf16Offsets::new(text);
    let (agent, _) = boot(4096);
    let mut highlighter = Highlighter::new(agent, text).unwrap();

    // エディタ上で "1" と "3" の間（UTF-16 の 4）にカーソル
    highlighter
        .on_update(EditorUpdate { text: None, cursor: Some(offsets.to_byte(4)) })
        .unwrap();
    let decorations = to_editor_units(&highlighter.decorations(), &offsets);
    let json = zenpaper_wasm::decorations_json(&decorations).unwrap();
    assert_eq!(
        json,
        r#"[{"start":3,"end":6,"class":"zp-chord"},{"start":3,"end":6,"class":"zp-dependency"},{"start":7,"end":13,"class":"zp-comment"}]"#
    );
}

proptest! {
    /// デコードされたスパンはすべてテキストの範囲内にある
    #[test]
    fn test_spans_within_text(text in "[0-9a-z ;\n]{0,400}") {
        let (mut agent, _) = boot(1024);
        let spans = agent.update_document(&text).unwrap();
        for span in &spans {
            prop_assert!(span.start <= span.end);
            prop_assert!(span.end as usize <= text.len());
            prop_assert!(HighlightTag::ALL.contains(&span.tag));
        }
        prop_assert_eq!(spans.len(), tokenize(text.as_bytes()).len());
    }

    /// カーソル位置の結果も最後のテキストの範囲内にある
    #[test]
    fn test_cursor_spans_within_text(text in "[0-9 ;\n]{1,200}", at in 0usize..200) {
        let (mut agent, _) = boot(1024);
        agent.update_document(&text).unwrap();
        let position = (at % (text.len() + 1)) as u32;
        let spans = agent.move_cursor(position).unwrap();
        for span in &spans {
            prop_assert_eq!(span.tag, HighlightTag::DependencyReference);
            prop_assert!(span.end as usize <= text.len());
        }
    }
}
