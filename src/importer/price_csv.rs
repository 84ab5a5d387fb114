// ==========================================
// EVE 工业规划系统 - 市场价格快照导入
// ==========================================
// 数据源: 市场数据导出 CSV
// 列: type_id, buy_price, sell_price, adjusted_price
// 产出: 价格批量映射 (内存价格仓储可直接装载)
// ==========================================

use crate::domain::types::TypeId;
use crate::engine::snapshot::MarketPrice;
use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// CSV 行格式
#[derive(Debug, Deserialize)]
struct PriceRow {
    type_id: TypeId,
    buy_price: f64,
    sell_price: f64,
    adjusted_price: f64,
}

/// 导入结果: 市场价 + 调整价两张映射
#[derive(Debug, Default)]
pub struct PriceSnapshot {
    pub market_prices: HashMap<TypeId, MarketPrice>,
    pub adjusted_prices: HashMap<TypeId, f64>,
}

// ==========================================
// PriceCsvImporter - 价格快照导入器
// ==========================================
pub struct PriceCsvImporter;

impl PriceCsvImporter {
    pub fn new() -> Self {
        Self
    }

    /// 从 CSV 文件导入价格快照
    pub fn import_file(&self, path: &Path) -> RepositoryResult<PriceSnapshot> {
        let reader = csv::Reader::from_path(path)
            .map_err(|e| RepositoryError::ImportError(e.to_string()))?;
        self.import(reader)
    }

    /// 从任意读取器导入 (测试用)
    pub fn import_reader<R: Read>(&self, source: R) -> RepositoryResult<PriceSnapshot> {
        self.import(csv::Reader::from_reader(source))
    }

    fn import<R: Read>(&self, mut reader: csv::Reader<R>) -> RepositoryResult<PriceSnapshot> {
        let mut snapshot = PriceSnapshot::default();
        for (line, row) in reader.deserialize::<PriceRow>().enumerate() {
            let row = row.map_err(|e| {
                RepositoryError::ImportError(format!("第 {} 行解析失败: {}", line + 2, e))
            })?;
            snapshot.market_prices.insert(
                row.type_id,
                MarketPrice {
                    buy_isk: row.buy_price,
                    sell_isk: row.sell_price,
                },
            );
            snapshot
                .adjusted_prices
                .insert(row.type_id, row.adjusted_price);
        }
        info!(count = snapshot.market_prices.len(), "价格快照导入完成");
        Ok(snapshot)
    }
}

impl Default for PriceCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_from_reader() {
        let csv = "type_id,buy_price,sell_price,adjusted_price\n\
                   34,4.1,4.5,4.0\n\
                   35,10.0,11.2,9.8\n";
        let snap = PriceCsvImporter::new()
            .import_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(snap.market_prices.len(), 2);
        assert!((snap.market_prices[&34].sell_isk - 4.5).abs() < 1e-9);
        assert!((snap.adjusted_prices[&35] - 9.8).abs() < 1e-9);
    }

    #[test]
    fn test_import_rejects_malformed_row() {
        let csv = "type_id,buy_price,sell_price,adjusted_price\n\
                   34,not_a_number,4.5,4.0\n";
        let err = PriceCsvImporter::new()
            .import_reader(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ImportError(_)));
    }
}
