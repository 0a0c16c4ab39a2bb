use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 台灣銀行黃金存摺牌價頁
pub const TBOC_URL: &str = "https://rate.bot.com.tw/gold/quote/recent";

/// 煒盛貴金屬商城（零售金條、金幣）
pub const WDPM_URL: &str = "https://wdpmshop.com.tw/shop/";

/// 擷取溢價頁時使用的識別用 User-Agent
pub const PREMIUM_BOT_UA: &str = "Mozilla/5.0 (compatible; PremiumBot/1.0; +github-actions)";

/// 黃金存摺列的關鍵字
pub const PASSBOOK_MARKER: &str = "存摺";
/// 計價單位的關鍵字
pub const GRAM_MARKER: &str = "公克";
/// 一單位數量的關鍵字
pub const ONE_MARKER: &str = "1";
/// 銀行賣出欄的關鍵字
pub const SELL_MARKER: &str = "賣出";

/// 快照內的品名
pub const QUOTE_PRODUCT: &str = "台灣銀行 黃金存摺 1 公克 賣出";

/// 文字鄰近策略可信的價格下限（新臺幣/公克）
pub const PRICE_FLOOR: Decimal = dec!(1000);
/// 文字鄰近策略可信的價格上限（新臺幣/公克）
pub const PRICE_CEILING: Decimal = dec!(10000);

/// 一金衡盎司的公克數
pub const GRAMS_PER_OUNCE: Decimal = dec!(31.1035);
/// 半金衡盎司的公克數
pub const GRAMS_PER_HALF_OUNCE: Decimal = dec!(15.5517);

/// 追蹤的金品項目（品牌關鍵字、克數、顯示用標籤）
#[derive(Debug, Clone)]
pub struct ProductSpec {
    /// 品牌比對用的正則（不分大小寫）
    pub brand_pattern: &'static str,
    /// 含金量（公克）
    pub grams: Decimal,
    /// 顯示用標籤
    pub label: &'static str,
}

/// 追蹤的金品目錄
pub const PRODUCTS: [ProductSpec; 12] = [
    // PAMP Lady Fortuna
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(1), label: "PAMP 財富女神 1g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(2.5), label: "PAMP 財富女神 2.5g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(5), label: "PAMP 財富女神 5g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(10), label: "PAMP 財富女神 10g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(20), label: "PAMP 財富女神 20g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(50), label: "PAMP 財富女神 50g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(100), label: "PAMP 財富女神 100g" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(15.5517), label: "PAMP 財富女神 0.5oz" },
    ProductSpec { brand_pattern: "PAMP|財富女神", grams: dec!(31.1035), label: "PAMP 財富女神 1oz" },
    // Perth Mint
    ProductSpec { brand_pattern: "Perth|伯斯|天鵝", grams: dec!(1), label: "Perth Mint 1g" },
    ProductSpec { brand_pattern: "Perth|伯斯|天鵝", grams: dec!(5), label: "Perth Mint 5g" },
    ProductSpec { brand_pattern: "Perth|伯斯|天鵝", grams: dec!(31.1035), label: "Perth Mint 1oz" },
];
