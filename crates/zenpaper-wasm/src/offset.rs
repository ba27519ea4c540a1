//! UTF-8 バイトオフセットと UTF-16 コード単位の相互変換
//!
//! 解析モジュールとの受け渡しはすべて UTF-8 のバイトオフセットだが、
//! エディタ（CodeMirror）の位置は UTF-16 のコード単位で数える。
//! ASCII だけの文書では両者は一致する。
//!
//! ```text
//! "和音 135"     和    音    ␠   1   3   5
//! UTF-8          0..3  3..6  6   7   8   9
//! UTF-16         0     1     2   3   4   5
//! ```

use alloc::vec::Vec;

use zenpaper_agent::Decoration;

/// 非 ASCII 文字 1 つの位置と幅
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    byte: u32,
    utf16: u32,
    byte_width: u32,
    utf16_width: u32,
}

/// 1 つのテキストに対する変換表
///
/// 非 ASCII 文字の位置だけを持ち、その間は 1 バイト = 1 コード単位で補間する。
/// 文字の途中を指す位置は、その文字の先頭に丸める。範囲外は末尾に丸める。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utf16Offsets {
    marks: Vec<Mark>,
    byte_len: u32,
    utf16_len: u32,
}

impl Utf16Offsets {
    pub fn new(text: &str) -> Self {
        let byte_len = text.len() as u32;
        if text.is_ascii() {
            return Utf16Offsets {
                marks: Vec::new(),
                byte_len,
                utf16_len: byte_len,
            };
        }

        let mut marks = Vec::new();
        let mut utf16 = 0u32;
        for (byte, ch) in text.char_indices() {
            let utf16_width = ch.len_utf16() as u32;
            if !ch.is_ascii() {
                marks.push(Mark {
                    byte: byte as u32,
                    utf16,
                    byte_width: ch.len_utf8() as u32,
                    utf16_width,
                });
            }
            utf16 += utf16_width;
        }
        Utf16Offsets {
            marks,
            byte_len,
            utf16_len: utf16,
        }
    }

    /// バイトオフセット → UTF-16 コード単位
    pub fn to_utf16(&self, byte: u32) -> u32 {
        let byte = byte.min(self.byte_len);
        let i = self.marks.partition_point(|m| m.byte <= byte);
        let Some(mark) = i.checked_sub(1).map(|i| self.marks[i]) else {
            return byte;
        };
        if byte < mark.byte + mark.byte_width {
            mark.utf16
        } else {
            mark.utf16 + mark.utf16_width + (byte - mark.byte - mark.byte_width)
        }
    }

    /// UTF-16 コード単位 → バイトオフセット
    pub fn to_byte(&self, utf16: u32) -> u32 {
        let utf16 = utf16.min(self.utf16_len);
        let i = self.marks.partition_point(|m| m.utf16 <= utf16);
        let Some(mark) = i.checked_sub(1).map(|i| self.marks[i]) else {
            return utf16;
        };
        if utf16 < mark.utf16 + mark.utf16_width {
            mark.byte
        } else {
            mark.byte + mark.byte_width + (utf16 - mark.utf16 - mark.utf16_width)
        }
    }
}

/// 装飾の範囲をエディタの単位（UTF-16）に直す
///
/// 変換は単調なので並び順は変わらない。
pub fn to_editor_units(decorations: &[Decoration], offsets: &Utf16Offsets) -> Vec<Decoration> {
    decorations
        .iter()
        .map(|d| Decoration {
            start: offsets.to_utf16(d.start),
            end: offsets.to_utf16(d.end),
            class: d.class,
        })
        .collect()
}
