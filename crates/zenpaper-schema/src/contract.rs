//! プロトコル世代ごとのインターフェース契約
//!
//! モジュールのエクスポートは本来どんなシグネチャでも持てる。
//! ここで世代ごとに名前と引数の数を固定し、ホストは起動時に一度だけ照合する。
//!
//! | 世代 | 更新エクスポート | 結果 | カーソル | ログ import |
//! |---|---|---|---|---|
//! | Batch (1) | `startDocumentUpdate` / `endDocumentUpdate` | `SpanCollection` 直接 | なし | `consoleLog` |
//! | Tagged (2) | `startUpdate` / `endUpdate` | `UpdateResult`（0 = 空） | なし | `log` |
//! | Incremental (3) | `startUpdate` / `endUpdate` | `UpdateResult`（0 = 空） | `moveCursor` | `log` |

use num_enum::{IntoPrimitive, TryFromPrimitive};
use zenpaper_memory::Snapshot;
use zenpaper_view::{OptionalOneView, ViewError};

use crate::collection::{SpanCollection, UpdateResult};

/// host import のモジュール名
pub const IMPORT_MODULE: &str = "env";

/// 共有メモリの import 名
pub const MEMORY_IMPORT: &str = "memory";

/// プロトコルの世代
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ProtocolVersion {
    /// 全文更新のみ、結果は封筒なし
    Batch = 1,
    /// 複数タグ、結果は `UpdateResult` 封筒
    Tagged = 2,
    /// Tagged + カーソル移動による差分更新
    #[default]
    Incremental = 3,
}

impl ProtocolVersion {
    /// 最新の世代
    pub const LATEST: ProtocolVersion = ProtocolVersion::Incremental;

    /// この世代の契約
    pub fn contract(self) -> &'static InterfaceContract {
        match self {
            ProtocolVersion::Batch => &BATCH,
            ProtocolVersion::Tagged => &TAGGED,
            ProtocolVersion::Incremental => &INCREMENTAL,
        }
    }
}

/// エクスポート関数 1 つの名前と引数の数
///
/// 戻り値はすべて 1 つの u32（アドレス）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSpec {
    pub name: &'static str,
    pub params: u32,
}

/// 全文更新の結果アドレスが指すレコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// `SpanCollection` を直接指す
    Collection,
    /// `UpdateResult` 封筒を指す
    Envelope,
}

impl ResultShape {
    /// 結果アドレスをデコードする。アドレス 0 は空集合
    pub fn decode<'a>(self, snapshot: Snapshot<'a>, address: u32) -> Result<SpanCollection<'a>, ViewError> {
        match self {
            ResultShape::Collection => match OptionalOneView::<SpanCollection>::new(snapshot, address).unwrap() {
                Some(view) => view.get(),
                None => Ok(SpanCollection::empty(snapshot)),
            },
            ResultShape::Envelope => match OptionalOneView::<UpdateResult>::new(snapshot, address).unwrap() {
                Some(view) => Ok(view.get()?.highlights),
                None => Ok(SpanCollection::empty(snapshot)),
            },
        }
    }
}

/// 1 つの世代のモジュールインターフェース
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceContract {
    pub version: ProtocolVersion,
    /// `(len) -> address`: 書き込み先を返す
    pub start_update: ExportSpec,
    /// `() -> address`: 分類結果を返す
    pub end_update: ExportSpec,
    /// `(position) -> address`: カーソル依存のスパン集合を返す
    pub move_cursor: Option<ExportSpec>,
    /// `end_update` の結果の形
    pub update_result: ResultShape,
    /// `(address, length)` のログ関数の import 名
    pub log_import: &'static str,
}

impl InterfaceContract {
    /// 起動時に照合すべきエクスポートの一覧
    pub fn exports(&self) -> impl Iterator<Item = &ExportSpec> {
        [Some(&self.start_update), Some(&self.end_update), self.move_cursor.as_ref()]
            .into_iter()
            .flatten()
    }
}

static BATCH: InterfaceContract = InterfaceContract {
    version: ProtocolVersion::Batch,
    start_update: ExportSpec { name: "startDocumentUpdate", params: 1 },
    end_update: ExportSpec { name: "endDocumentUpdate", params: 0 },
    move_cursor: None,
    update_result: ResultShape::Collection,
    log_import: "consoleLog",
};

static TAGGED: InterfaceContract = InterfaceContract {
    version: ProtocolVersion::Tagged,
    start_update: ExportSpec { name: "startUpdate", params: 1 },
    end_update: ExportSpec { name: "endUpdate", params: 0 },
    move_cursor: None,
    update_result: ResultShape::Envelope,
    log_import: "log",
};

static INCREMENTAL: InterfaceContract = InterfaceContract {
    version: ProtocolVersion::Incremental,
    start_update: ExportSpec { name: "startUpdate", params: 1 },
    end_update: ExportSpec { name: "endUpdate", params: 0 },
    move_cursor: Some(ExportSpec { name: "moveCursor", params: 1 }),
    update_result: ResultShape::Envelope,
    log_import: "log",
};
