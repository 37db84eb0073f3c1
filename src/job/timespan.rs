//! 時間間隔の文字列表現
//!
//! `<数値><単位>` の連結（例: `1D12h`）。単位は大文字小文字を区別する。
//!
//! | 単位 | 意味 |
//! |------|------|
//! | `s`  | 秒 |
//! | `m`  | 分 |
//! | `h`  | 時間 |
//! | `D`  | 日 |
//! | `W`  | 週 |
//! | `M`  | 月（30 日換算） |
//! | `Y`  | 年（365 日換算） |
//!
//! 単位のない数値のみの場合は秒として扱う。

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "s" => Some(1),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        "D" => Some(DAY),
        "W" => Some(7 * DAY),
        "M" => Some(30 * DAY),
        "Y" => Some(365 * DAY),
        _ => None,
    }
}

/// 時間間隔をパース
///
/// 不正な書式やオーバーフローは None。
pub fn parse_timespan(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return input.parse::<u64>().ok().map(Duration::from_secs);
    }

    static WHOLE: OnceLock<Regex> = OnceLock::new();
    static PART: OnceLock<Regex> = OnceLock::new();
    let whole = WHOLE.get_or_init(|| Regex::new(r"^(?:\d+[smhDWMY])+$").expect("static pattern"));
    if !whole.is_match(input) {
        return None;
    }

    let part = PART.get_or_init(|| Regex::new(r"(\d+)([smhDWMY])").expect("static pattern"));
    let mut total: u64 = 0;
    for caps in part.captures_iter(input) {
        let amount: u64 = caps[1].parse().ok()?;
        let seconds = amount.checked_mul(unit_seconds(&caps[2])?)?;
        total = total.checked_add(seconds)?;
    }

    Some(Duration::from_secs(total))
}

#[cfg(test)]
#[path = "timespan_test.rs"]
mod tests;
