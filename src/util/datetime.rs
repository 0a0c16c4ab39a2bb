use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::Lazy;

/// 台北時區（UTC+8，無日光節約時間）
static TAIPEI: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(8 * 60 * 60).expect("UTC+8 is a valid offset"));

/// 回傳台北時區的目前時間
pub fn now_taipei() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&*TAIPEI)
}

/// 回傳 "%Y-%m-%d %H:%M:%S" 格式的台北時間字串
pub fn timestamp_taipei() -> String {
    now_taipei().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    #[test]
    fn test_now_taipei_offset() {
        let now = now_taipei();
        assert_eq!(now.offset().local_minus_utc(), 8 * 60 * 60);
    }

    #[test]
    fn test_timestamp_taipei_format() {
        let ts = timestamp_taipei();
        assert!(NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
