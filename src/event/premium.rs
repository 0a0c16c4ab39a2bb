use std::path::PathBuf;

use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::{
    config::SETTINGS,
    crawler::{
        tboc,
        wdpm::{self, RetailMatch},
    },
    declare, logging, store,
    util::datetime,
};

/// 單一品項的溢價
#[derive(Debug, Clone, Serialize)]
pub struct PremiumRecord {
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub grams: Decimal,
    pub retail_price_twd: i64,
    /// 含金量以存摺賣出價折算的基準價
    #[serde(with = "rust_decimal::serde::float")]
    pub tboc_base_twd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub premium_twd: Decimal,
    /// 基準價為零時無法計算，輸出 null
    #[serde(with = "rust_decimal::serde::float_option")]
    pub premium_pct: Option<Decimal>,
    /// 命中品項的上下文片段，供頁面改版時除錯
    pub context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSource {
    pub tboc: String,
    pub wdpm: String,
}

/// 一次溢價計算的完整輸出（每次執行整檔覆寫）
#[derive(Debug, Clone, Serialize)]
pub struct PremiumBatch {
    pub timestamp_taipei: String,
    pub source: BatchSource,
    #[serde(with = "rust_decimal::serde::float")]
    pub tboc_gram_sell: Decimal,
    pub items: Vec<PremiumRecord>,
    /// 頁面上找不到對應候選的品項標籤
    pub unmatched: Vec<String>,
}

/// 計算目錄中各金品相對黃金存摺賣出價的溢價並覆寫批次檔。
///
/// 基準價優先讀取上一次的快照檔，沒有快照時改以表格結構策略直接
/// 重抓台銀頁面；兩者皆無法取得時為致命錯誤。
pub async fn execute() -> Result<()> {
    let data_dir = PathBuf::from(&SETTINGS.data_dir);

    let base = match store::read_snapshot(&data_dir) {
        Some(quote) => quote.price_twd_per_gram,
        None => tboc::visit_table_only(&SETTINGS.tboc_url).await?,
    };

    let candidates = wdpm::visit(&SETTINGS.wdpm_url).await?;
    let (matched, unmatched) = wdpm::match_products(&candidates, &declare::PRODUCTS)?;

    if !unmatched.is_empty() {
        logging::info_file_async(format!("premium unmatched: {:?}", unmatched));
    }

    let batch = assemble_batch(datetime::timestamp_taipei(), base, matched, unmatched);

    store::ensure_data_dir(&data_dir)?;
    store::write_json(&store::batch_path(&data_dir), &batch)?;

    println!("DONE premiums {} items", batch.items.len());

    Ok(())
}

/// 以同一組輸入組出完整的批次輸出；時間戳以外的內容完全由輸入決定。
pub(crate) fn assemble_batch(
    timestamp_taipei: String,
    base: Decimal,
    matched: Vec<RetailMatch>,
    unmatched: Vec<String>,
) -> PremiumBatch {
    PremiumBatch {
        timestamp_taipei,
        source: BatchSource {
            tboc: SETTINGS.tboc_url.clone(),
            wdpm: SETTINGS.wdpm_url.clone(),
        },
        tboc_gram_sell: base,
        items: build_records(base, matched),
        unmatched,
    }
}

/// 以單一基準價折算每個命中品項的溢價，並依標籤排序。
///
/// 金額取 2 位小數、百分比取 3 位、克數取 4 位，四捨五入採 .5 進位。
pub(crate) fn build_records(base: Decimal, matched: Vec<RetailMatch>) -> Vec<PremiumRecord> {
    let mut items: Vec<PremiumRecord> = matched
        .into_iter()
        .map(|m| {
            let base_value = base * m.grams;
            let premium = Decimal::from(m.retail_price_twd) - base_value;
            let premium_pct = if base_value > Decimal::ZERO {
                Some(
                    (premium / base_value * dec!(100))
                        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero),
                )
            } else {
                None
            };

            PremiumRecord {
                label: m.label,
                grams: m
                    .grams
                    .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
                retail_price_twd: m.retail_price_twd,
                tboc_base_twd: base_value
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                premium_twd: premium
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                premium_pct,
                context: m.context,
            }
        })
        .collect();

    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}
