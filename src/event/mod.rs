/// 黃金存摺牌價擷取批次
pub mod gold_quote;
/// 金品溢價計算批次
pub mod premium;
