use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use reqwest::header::{HeaderMap, USER_AGENT};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use scraper::Html;

use crate::{crawler, declare, declare::ProductSpec, util, util::text};

/// 零售標價的形狀：可帶幣別符號、千分位與「元」字尾
static RETAIL_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:NT\$|＄|\$)?\s*([1-9]\d{2,}(?:,\d{3})*)\s*(?:元)?")
        .expect("RETAIL_PRICE pattern")
});

/// 上下文截斷長度（字元數），只留足以辨識品項的片段
const CONTEXT_EXCERPT_CHARS: usize = 160;

/// 頁面上的一組（上下文, 價格）候選
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub context: String,
    pub price: i64,
}

/// 目錄中某一品項比對到的零售價
#[derive(Debug, Clone)]
pub struct RetailMatch {
    pub label: String,
    pub grams: Decimal,
    pub retail_price_twd: i64,
    pub context: String,
}

/// 抓取零售頁並回傳所有（上下文, 價格）候選。
pub async fn visit(url: &str) -> Result<Vec<Candidate>> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, declare::PREMIUM_BOT_UA.parse()?);

    let page = util::http::get(url, Some(headers)).await?;
    let document = Html::parse_document(&page);

    Ok(harvest_candidates(&document))
}

/// 把頁面文字攤平成行，對每一行以前 2 後 2 行組成上下文，
/// 記錄該上下文內最大的標價。
pub(crate) fn harvest_candidates(document: &Html) -> Vec<Candidate> {
    let lines = crawler::visible_text(document);
    let mut candidates = Vec::with_capacity(lines.len());

    for i in 0..lines.len() {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(lines.len());
        let context = lines[start..end].join(" ");

        let best = RETAIL_PRICE
            .captures_iter(&context)
            .filter_map(|caps| text::parse_i64(&caps[1], None).ok())
            .max();

        if let Some(price) = best {
            candidates.push(Candidate { context, price });
        }
    }

    candidates
}

/// 依克數推導可接受的規格關鍵字樣式。
///
/// 一盎司與半盎司（相對誤差 1e-3 內）比對盎司字樣；其餘克數
/// 以四捨五入（.5 進位）後的整數克數比對。
pub(crate) fn weight_patterns(grams: Decimal) -> Vec<String> {
    if is_close(grams, declare::GRAMS_PER_OUNCE) {
        return vec![
            r"\b1\s*oz\b".to_string(),
            r"1\s*盎司".to_string(),
            "一盎司".to_string(),
        ];
    }

    if is_close(grams, declare::GRAMS_PER_HALF_OUNCE) {
        return vec![
            r"0\.5\s*oz".to_string(),
            "半盎司".to_string(),
            r"0\.5\s*盎司".to_string(),
        ];
    }

    let n = grams.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    vec![format!(r"\b{}\s*g\b", n), format!(r"{}\s*公克", n)]
}

fn is_close(grams: Decimal, target: Decimal) -> bool {
    (grams - target).abs() <= target * dec!(0.001)
}

/// 逐品項比對候選清單，回傳命中的品項與沒有任何候選命中的標籤。
///
/// 候選依頁面順序掃描，品牌與規格都命中的第一筆為準；沒命中不視為錯誤，
/// 僅列入未命中清單以利除錯。
pub fn match_products(
    candidates: &[Candidate],
    catalog: &[ProductSpec],
) -> Result<(Vec<RetailMatch>, Vec<String>)> {
    let mut matched = Vec::with_capacity(catalog.len());
    let mut unmatched = Vec::new();

    for spec in catalog {
        let brand = build_pattern(spec.brand_pattern)?;
        let weights = weight_patterns(spec.grams)
            .iter()
            .map(|p| build_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        let hit = candidates.iter().find(|candidate| {
            brand.is_match(&candidate.context)
                && weights.iter().any(|w| w.is_match(&candidate.context))
        });

        match hit {
            Some(candidate) => matched.push(RetailMatch {
                label: spec.label.to_string(),
                grams: spec.grams,
                retail_price_twd: candidate.price,
                context: candidate.context.chars().take(CONTEXT_EXCERPT_CHARS).collect(),
            }),
            None => unmatched.push(spec.label.to_string()),
        }
    }

    Ok((matched, unmatched))
}

fn build_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|why| anyhow!("Failed to build pattern '{}' because {:?}", pattern, why))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 品項之間以數行不含數字的雜訊隔開，模擬真實商品列表的版面
    const SHOP_PAGE: &str = r#"
        <html><body>
        <p>商品分類</p>
        <div><h3>PAMP 財富女神 5g 金條</h3><span>NT$ 13500 元</span></div>
        <p>加入購物車</p><p>庫存充足</p><p>免運費</p><p>產品說明</p>
        <div><h3>PAMP 財富女神 1oz 金條</h3><span>NT$ 105,000</span></div>
        <p>加入購物車</p><p>庫存充足</p><p>免運費</p><p>產品說明</p>
        <div><h3>Perth Mint 天鵝 1 盎司 金幣</h3><span>$ 106,500</span></div>
        <p>加入購物車</p>
        </body></html>
    "#;

    fn catalog() -> Vec<ProductSpec> {
        vec![
            ProductSpec {
                brand_pattern: "PAMP|財富女神",
                grams: dec!(5),
                label: "PAMP 財富女神 5g",
            },
            ProductSpec {
                brand_pattern: "PAMP|財富女神",
                grams: dec!(31.1035),
                label: "PAMP 財富女神 1oz",
            },
            ProductSpec {
                brand_pattern: "Perth|伯斯|天鵝",
                grams: dec!(31.1035),
                label: "Perth Mint 1oz",
            },
            ProductSpec {
                brand_pattern: "PAMP|財富女神",
                grams: dec!(100),
                label: "PAMP 財富女神 100g",
            },
        ]
    }

    #[test]
    fn test_weight_patterns_for_ounces() {
        let patterns = weight_patterns(dec!(31.1035));
        assert!(patterns.iter().any(|p| p.contains("oz")));
        assert!(patterns.iter().any(|p| p.contains("盎司")));
        // 一盎司不得退化成 31 公克的整數比對
        assert!(!patterns.iter().any(|p| p.contains("31")));

        let half = weight_patterns(dec!(15.5517));
        assert!(half.iter().any(|p| p.contains("半盎司")));
    }

    #[test]
    fn test_weight_patterns_round_half_up() {
        // .5 克採四捨五入進位，2.5 -> 3
        assert_eq!(
            weight_patterns(dec!(2.5)),
            vec![r"\b3\s*g\b".to_string(), r"3\s*公克".to_string()]
        );
        assert_eq!(
            weight_patterns(dec!(2.4)),
            vec![r"\b2\s*g\b".to_string(), r"2\s*公克".to_string()]
        );
    }

    #[test]
    fn test_harvest_candidates() {
        let document = Html::parse_document(SHOP_PAGE);
        let candidates = harvest_candidates(&document);

        assert!(!candidates.is_empty());
        assert!(candidates
            .iter()
            .any(|c| c.context.contains("財富女神 5g") && c.price == 13_500));
        assert!(candidates
            .iter()
            .any(|c| c.context.contains("1oz") && c.price == 105_000));
    }

    #[test]
    fn test_match_products() {
        let document = Html::parse_document(SHOP_PAGE);
        let candidates = harvest_candidates(&document);
        let (matched, unmatched) = match_products(&candidates, &catalog()).unwrap();

        let five_gram = matched
            .iter()
            .find(|m| m.label == "PAMP 財富女神 5g")
            .unwrap();
        assert_eq!(five_gram.retail_price_twd, 13_500);

        let one_ounce = matched
            .iter()
            .find(|m| m.label == "PAMP 財富女神 1oz")
            .unwrap();
        assert_eq!(one_ounce.retail_price_twd, 105_000);

        let perth = matched.iter().find(|m| m.label == "Perth Mint 1oz").unwrap();
        assert_eq!(perth.retail_price_twd, 106_500);

        // 頁面上沒有 100g 品項，僅列入未命中清單
        assert_eq!(unmatched, vec!["PAMP 財富女神 100g".to_string()]);
    }

    #[test]
    fn test_harvest_requires_three_leading_digits_before_grouping() {
        // 千分位前只有兩位數的標價（如 13,500）只會擷取到逗號後的片段，
        // 也就是說這種版面不會產生正確的候選價格
        let document = Html::parse_document(
            "<div><h3>PAMP 財富女神 5g 金條</h3><span>NT$ 13,500 元</span></div>",
        );
        let candidates = harvest_candidates(&document);

        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|c| c.price == 500));
    }

    #[test]
    fn test_match_products_is_case_insensitive() {
        let candidates = vec![Candidate {
            context: "pamp 財富女神 5G 金條 13500 元".to_string(),
            price: 13_500,
        }];
        let (matched, _) = match_products(&candidates, &catalog()[..1]).unwrap();
        assert_eq!(matched.len(), 1);
    }
}
