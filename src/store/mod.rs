use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{crawler::tboc::GoldQuote, logging};

/// 黃金存摺快照檔（每次執行整檔覆寫）
pub const SNAPSHOT_FILE: &str = "tboc_goldpassbook.json";
/// 歷史紀錄檔（只追加，不重寫）
pub const HISTORY_FILE: &str = "history.csv";
/// 溢價批次檔（每次執行整檔覆寫）
pub const BATCH_FILE: &str = "premiums.json";

const HISTORY_HEADER: [&str; 2] = ["timestamp_taipei", "price_twd_per_gram"];

/// 確保輸出目錄存在
pub fn ensure_data_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|why| anyhow!("Failed to create {} because {:?}", dir.display(), why))
}

pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE)
}

pub fn history_path(dir: &Path) -> PathBuf {
    dir.join(HISTORY_FILE)
}

pub fn batch_path(dir: &Path) -> PathBuf {
    dir.join(BATCH_FILE)
}

/// 將序列化後的 JSON 整檔覆寫到指定路徑
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .map_err(|why| anyhow!("Failed to write {} because {:?}", path.display(), why))
}

/// 讀取上一次的快照，檔案不存在或無法解析時回傳 None
pub fn read_snapshot(dir: &Path) -> Option<GoldQuote> {
    let path = snapshot_path(dir);
    let content = fs::read_to_string(&path).ok()?;

    match serde_json::from_str::<GoldQuote>(&content) {
        Ok(quote) => Some(quote),
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to parse {} because {:?}",
                path.display(),
                why
            ));
            None
        }
    }
}

/// 在歷史紀錄檔尾端追加一列，檔案不存在時先寫入表頭
pub fn append_history(dir: &Path, timestamp: &str, price: Decimal) -> Result<()> {
    let path = history_path(dir);
    let write_header = !path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|why| anyhow!("Failed to open {} because {:?}", path.display(), why))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if write_header {
        writer.write_record(HISTORY_HEADER)?;
    }

    let price_field = price.to_string();
    writer.write_record([timestamp, price_field.as_str()])?;
    writer.flush()?;

    Ok(())
}
