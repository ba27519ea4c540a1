//! スパン → エディタ装飾の変換

use alloc::vec::Vec;

use serde::Serialize;
use zenpaper_schema::{HighlightTag, Span};

/// 表示スタイル（CSS クラス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VisualClass {
    #[serde(rename = "zp-comment")]
    Comment,
    #[serde(rename = "zp-chord")]
    Chord,
    #[serde(rename = "zp-dependency")]
    Dependency,
}

impl VisualClass {
    /// タグ → スタイルの固定対応（列挙全体を網羅する）
    pub fn for_tag(tag: HighlightTag) -> Self {
        match tag {
            HighlightTag::Comment => VisualClass::Comment,
            HighlightTag::Chord => VisualClass::Chord,
            HighlightTag::DependencyReference => VisualClass::Dependency,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            VisualClass::Comment => "zp-comment",
            VisualClass::Chord => "zp-chord",
            VisualClass::Dependency => "zp-dependency",
        }
    }
}

/// エディタに渡す装飾 `(start, end, class)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Decoration {
    pub start: u32,
    pub end: u32,
    pub class: VisualClass,
}

/// スパンの列を装飾の集合にする
///
/// 結果は `(start, end, class)` の昇順で重複なし。
/// エディタの RangeSet ビルダーは開始位置の昇順で追加する必要がある。
pub fn decorations_for<I>(spans: I) -> Vec<Decoration>
where
    I: IntoIterator<Item = Span>,
{
    let mut decorations: Vec<Decoration> = spans
        .into_iter()
        .map(|span| Decoration {
            start: span.start,
            end: span.end,
            class: VisualClass::for_tag(span.tag),
        })
        .collect();
    decorations.sort_unstable();
    decorations.dedup();
    decorations
}
