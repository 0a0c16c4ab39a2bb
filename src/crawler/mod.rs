use scraper::Html;

/// 台灣銀行 黃金存摺牌價
pub mod tboc;
/// 煒盛貴金屬商城
pub mod wdpm;

/// 依文件順序回傳頁面上所有非空白的文字節點（已去除前後空白）。
///
/// 兩個擷取來源的文字鄰近策略都以這份序列為基礎。
pub(crate) fn visible_text(document: &Html) -> Vec<String> {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text() {
        let document =
            Html::parse_document("<div><span> 黃金存摺 </span><span></span><p>2550</p></div>");
        let lines = visible_text(&document);
        assert_eq!(lines, vec!["黃金存摺".to_string(), "2550".to_string()]);
    }
}
