//! # zenpaper-view
//!
//! 線形メモリ上のバイト列に対する型付き読み取り専用ビュー。
//!
//! モジュールが返す結果はポインタ（アドレス）と固定レイアウトのレコードで
//! 構成される。このクレートはポインタ・スライスのエミュレーションを
//! 値型のビューとして提供し、呼び出し側に生のアドレス計算を見せない。
//!
//! ## ビューの種類
//!
//! ```text
//! OneView<T>          address にあるレコード 1 つ
//! ManyView<T>         address + index * T::SIZE にあるレコード（ストライド配列）
//! OptionalOneView<T>  address == 0 なら「なし」
//! OptionalManyView<T> address == 0 なら「なし」
//! ```
//!
//! 整数はすべてリトルエンディアン、レコードはパディングなしで詰められる。
//! ビューは `Snapshot` を借用するため、そのスナップショットを取った
//! デコード処理の外へ持ち出すことはできない。

#![no_std]

#[cfg(test)]
extern crate alloc;

pub mod error;
pub mod many;
pub mod one;
pub mod record;

pub use error::ViewError;
pub use many::{ManyIter, ManyView, OptionalManyView};
pub use one::{OneView, OptionalOneView};
pub use record::{check_array, Record};

/// 「なし」を表すアドレス（ヌルポインタ）
pub const NULL_ADDRESS: u32 = 0;
