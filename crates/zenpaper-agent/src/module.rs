//! 解析モジュールの呼び出し面

use zenpaper_memory::LinearMemory;

use crate::error::ModuleError;

/// インスタンス化済みの解析モジュール
///
/// エクスポートは名前と u32 引数の列で呼ぶ、緩く型付けされた面。
/// どの名前をどの引数の数で呼ぶかは `InterfaceContract` が決め、
/// `WasmAgent::boot` が一度だけ照合する。
///
/// ## 実装
///
/// ```text
/// zenpaper-wasm::JsModule   ブラウザの WebAssembly.Instance
/// （テスト）フェイク          HostMemory の上でネイティブに動く
/// ```
///
/// host import（ログ関数）はインスタンス化の時点で `LogCapability` として
/// 渡される。呼び出しのたびに渡すことはない。
pub trait AnalysisModule {
    /// モジュールと共有する線形メモリ
    type Memory: LinearMemory;

    fn memory(&self) -> &Self::Memory;

    fn memory_mut(&mut self) -> &mut Self::Memory;

    /// エクスポート `name` の引数の数（関数でなければ `None`）
    fn export_arity(&self, name: &str) -> Option<u32>;

    /// エクスポート `name` を呼び、戻り値（アドレス）を返す
    ///
    /// 呼び出し中にモジュールがメモリを成長させることがある。
    fn call(&mut self, name: &str, args: &[u32]) -> Result<u32, ModuleError>;
}
