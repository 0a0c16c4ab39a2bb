use std::path::PathBuf;

use anyhow::Result;
use rust_decimal::RoundingStrategy;

use crate::{
    config::SETTINGS,
    crawler::tboc::{self, GoldQuote},
    declare, logging, store,
    util::datetime,
};

/// 擷取台銀黃金存摺 1 公克賣出價，覆寫快照檔並在歷史檔追加一列。
///
/// 擷取不到價格視為致命錯誤，整個批次中止且不寫入任何檔案。
pub async fn execute() -> Result<()> {
    let price = tboc::visit(&SETTINGS.tboc_url).await?;

    let quote = GoldQuote {
        timestamp_taipei: datetime::timestamp_taipei(),
        source: SETTINGS.tboc_url.clone(),
        product: declare::QUOTE_PRODUCT.to_string(),
        price_twd_per_gram: price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    };

    let data_dir = PathBuf::from(&SETTINGS.data_dir);
    store::ensure_data_dir(&data_dir)?;
    store::write_json(&store::snapshot_path(&data_dir), &quote)?;
    store::append_history(&data_dir, &quote.timestamp_taipei, quote.price_twd_per_gram)?;

    logging::info_file_async(format!(
        "gold_quote {} {} TWD/g",
        quote.timestamp_taipei, quote.price_twd_per_gram
    ));
    println!(
        "OK {} {} {} TWD/g",
        quote.timestamp_taipei, quote.product, quote.price_twd_per_gram
    );

    Ok(())
}
