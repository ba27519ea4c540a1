//! ホストがモジュールに提供する能力（host import）
//!
//! モジュールからホストへの呼び出しは `log(address, length)` だけ。
//! モジュールはこの能力に依存し、インスタンス化の時点で受け取る。

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use zenpaper_memory::LinearMemory;

/// モジュールの診断メッセージの出力先
pub trait LogSink {
    fn emit(&mut self, message: &str);
}

/// モジュールに注入するログ能力
///
/// `deliver` は決して失敗しない。読めない範囲は警告して捨て、
/// 不正な UTF-8 は置換文字で埋めて渡す。
pub struct LogCapability {
    sink: Box<dyn LogSink>,
}

impl LogCapability {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        LogCapability {
            sink: Box::new(sink),
        }
    }

    /// モジュールの `log(address, length)` を処理する
    pub fn deliver(&mut self, memory: &dyn LinearMemory, address: u32, length: u32) {
        match memory.read(address, length) {
            Ok(bytes) => self.sink.emit(&decode_log_message(&bytes)),
            Err(e) => log::warn!("dropping module log message: {}", e),
        }
    }
}

/// ログメッセージのバイト列を文字列にする（不正な UTF-8 は置換）
pub fn decode_log_message(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// `log` ファサードへ転送するシンク（target: `zenpaper::module`）
#[derive(Debug, Default, Clone, Copy)]
pub struct LogForwarder;

impl LogSink for LogForwarder {
    fn emit(&mut self, message: &str) {
        log::info!(target: "zenpaper::module", "{}", message);
    }
}

/// メッセージを溜めておくシンク
///
/// クローンは同じバッファを共有する。片方を `LogCapability` に渡し、
/// もう片方から `take` で読み出す。
#[derive(Debug, Default, Clone)]
pub struct BufferedSink {
    messages: Rc<RefCell<Vec<String>>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 溜まったメッセージをすべて取り出す
    pub fn take(&self) -> Vec<String> {
        core::mem::take(&mut *self.messages.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl LogSink for BufferedSink {
    fn emit(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zenpaper_memory::HostMemory;

    #[test]
    fn test_deliver_utf8() {
        let mut mem = HostMemory::new(64);
        mem.write(10, "和音 ok".as_bytes()).unwrap();
        let sink = BufferedSink::new();
        let mut cap = LogCapability::new(sink.clone());

        cap.deliver(&mem, 10, "和音 ok".len() as u32);
        assert_eq!(sink.take(), ["和音 ok"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_deliver_invalid_utf8_is_lossy() {
        let mut mem = HostMemory::new(16);
        mem.write(0, &[b'a', 0xFF, b'b']).unwrap();
        let sink = BufferedSink::new();
        let mut cap = LogCapability::new(sink.clone());

        cap.deliver(&mem, 0, 3);
        assert_eq!(sink.take(), ["a\u{FFFD}b"]);
    }

    #[test]
    fn test_deliver_out_of_range_is_dropped() {
        let mem = HostMemory::new(16);
        let sink = BufferedSink::new();
        let mut cap = LogCapability::new(sink.clone());

        // 失敗しても呼び出し元には何も返らない
        cap.deliver(&mem, 12, 8);
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_decode_log_message_borrowed_when_valid() {
        assert!(matches!(decode_log_message(b"plain"), Cow::Borrowed("plain")));
    }
}
