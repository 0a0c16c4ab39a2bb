use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::{crawler, declare, util::text};

/// 儲格內的第一個數字（可含千分位與小數）
static NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d,]+(?:\.\d+)?").expect("NUMERIC_TOKEN pattern"));

/// 可信的價格形狀：三位以上有效數字、可含千分位與小數
static PLAUSIBLE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[1-9]\d{2,}(?:,\d{3})*(?:\.\d+)?").expect("PLAUSIBLE_PRICE pattern"));

/// 「1 公克」，允許數字與單位間夾空白
static ONE_GRAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"1\s*公克").expect("ONE_GRAM pattern"));

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector"));
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("cell selector"));

/// 黃金存摺 1 公克賣出價的快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldQuote {
    pub timestamp_taipei: String,
    pub source: String,
    pub product: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_twd_per_gram: Decimal,
}

/// 抓取台銀牌價頁並回傳黃金存摺 1 公克的賣出價。
///
/// 先以表格結構比對，失敗時改用文字鄰近策略；兩者皆無結果視為致命錯誤。
pub async fn visit(url: &str) -> Result<Decimal> {
    let page = crate::util::http::get(url, None).await?;

    price_from_page(&page).ok_or_else(|| {
        anyhow!(
            "找不到『台銀黃金存摺 1 公克 賣出價』({})，請檢查頁面是否改版",
            url
        )
    })
}

/// 抓取台銀牌價頁，只以表格結構比對（快照檔不存在時的備援路徑）。
pub async fn visit_table_only(url: &str) -> Result<Decimal> {
    let page = crate::util::http::get(url, None).await?;

    gram_sell_from_table(&page, url)
}

/// 只以表格結構策略解析頁面，不退回文字鄰近策略。
pub(crate) fn gram_sell_from_table(page: &str, url: &str) -> Result<Decimal> {
    let document = Html::parse_document(page);

    extract_from_tables(&document)
        .ok_or_else(|| anyhow!("抓台銀 1 公克賣出價失敗（fallback）({})", url))
}

/// 對單一頁面依序套用兩種擷取策略，先成功者為準。
pub fn price_from_page(page: &str) -> Option<Decimal> {
    let document = Html::parse_document(page);

    extract_from_tables(&document).or_else(|| extract_from_text(&document))
}

/// 表格結構策略：在所有表格裡找同時包含「存摺」「公克」「1」的列，讀取「賣出」欄。
pub(crate) fn extract_from_tables(document: &Html) -> Option<Decimal> {
    for table in document.select(&TABLE_SELECTOR) {
        let mut rows = table.select(&ROW_SELECTOR);
        let headers = match rows.next() {
            Some(row) => cell_texts(&row),
            None => continue,
        };

        for row in rows {
            let cells = cell_texts(&row);
            if cells.is_empty() {
                continue;
            }

            let row_text = cells.join(" ");
            if !(row_text.contains(declare::PASSBOOK_MARKER)
                && row_text.contains(declare::GRAM_MARKER)
                && row_text.contains(declare::ONE_MARKER))
            {
                continue;
            }

            for (i, header) in headers.iter().enumerate() {
                if !header.contains(declare::SELL_MARKER) {
                    continue;
                }

                if let Some(price) = cells
                    .get(i)
                    .and_then(|cell| NUMERIC_TOKEN.find(cell))
                    .and_then(|m| text::parse_decimal(m.as_str(), None).ok())
                {
                    return Some(price);
                }
            }
        }
    }

    None
}

/// 文字鄰近策略：以前 3 後 3 個文字節點組成上下文，在含關鍵字的上下文裡
/// 取可信區間內的最大數字。
pub(crate) fn extract_from_text(document: &Html) -> Option<Decimal> {
    let lines = crawler::visible_text(document);

    for i in 0..lines.len() {
        let start = i.saturating_sub(3);
        let end = (i + 4).min(lines.len());
        let context = lines[start..end].join(" ");

        if !(context.contains(declare::PASSBOOK_MARKER)
            && context.contains(declare::SELL_MARKER)
            && ONE_GRAM.is_match(&context))
        {
            continue;
        }

        let best = PLAUSIBLE_PRICE
            .find_iter(&context)
            .filter_map(|m| text::parse_decimal(m.as_str(), None).ok())
            .filter(|price| *price >= declare::PRICE_FLOOR && *price <= declare::PRICE_CEILING)
            .max();

        if best.is_some() {
            return best;
        }
    }

    None
}

fn cell_texts(row: &ElementRef) -> Vec<String> {
    row.select(&CELL_SELECTOR)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const TABLE_PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th>品項</th><th>規格</th><th>本行買入</th><th>本行賣出</th></tr>
          <tr><td>黃金存摺</td><td>1公克</td><td>2,538</td><td>2,568</td></tr>
        </table>
        </body></html>
    "#;

    const TEXT_PAGE: &str = r#"
        <html><body>
        <div><span>黃金存摺</span><span>1 公克</span><span>賣出</span>
        <span>99</span><span>12000</span><span>2550</span></div>
        </body></html>
    "#;

    #[test]
    fn test_extract_from_tables() {
        let document = Html::parse_document(TABLE_PAGE);
        assert_eq!(extract_from_tables(&document), Some(dec!(2568)));
    }

    #[test]
    fn test_extract_from_tables_requires_all_markers() {
        let page = r#"
            <table>
              <tr><th>品項</th><th>本行賣出</th></tr>
              <tr><td>黃金條塊 100公克</td><td>256,800</td></tr>
            </table>
        "#;
        let document = Html::parse_document(page);
        assert_eq!(extract_from_tables(&document), None);
    }

    #[test]
    fn test_extract_from_text_respects_plausible_range() {
        let document = Html::parse_document(TEXT_PAGE);
        // 99 太短、12000 超出上限，只有 2550 落在 [1000, 10000] 內
        assert_eq!(extract_from_text(&document), Some(dec!(2550)));
    }

    #[test]
    fn test_extract_from_text_without_plausible_candidate() {
        let page = r#"
            <div><span>黃金存摺</span><span>1公克</span><span>賣出</span>
            <span>99</span><span>12000</span></div>
        "#;
        let document = Html::parse_document(page);
        assert_eq!(extract_from_text(&document), None);
    }

    #[test]
    fn test_price_from_page_falls_back_to_text() {
        assert_eq!(price_from_page(TEXT_PAGE), Some(dec!(2550)));
        assert_eq!(price_from_page(TABLE_PAGE), Some(dec!(2568)));
        assert_eq!(price_from_page("<html><body>改版了</body></html>"), None);
    }
}
