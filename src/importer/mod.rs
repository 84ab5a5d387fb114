// ==========================================
// EVE 工业规划系统 - 导入层
// ==========================================
// 职责: 外部数据文件 -> 批量映射
// ==========================================

pub mod price_csv;

pub use price_csv::{PriceCsvImporter, PriceSnapshot};
