//! ジョブ定義の構造検証
//!
//! 最初に見つかった問題の説明文を返す。状態は一切変更しない。

use crate::config::parse_bool;
use crate::job::{parse_timespan, JobDefinition, Schedule};
use chrono::{DateTime, NaiveDateTime, Weekday};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// 繰り返し間隔の下限
const MIN_REPEAT: Duration = Duration::from_secs(5 * 60);

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+)\s*(b|kb|mb|gb|tb)?\s*$").expect("static pattern")
    })
}

/// ジョブ定義とスケジュールを検証
pub fn validate_job(job: &JobDefinition, schedule: Option<&Schedule>) -> Option<String> {
    validate_definition(job).or_else(|| schedule.and_then(validate_schedule))
}

fn validate_definition(job: &JobDefinition) -> Option<String> {
    if job.name.trim().is_empty() {
        return Some("Missing a name".to_string());
    }
    if job.target_url.trim().is_empty() {
        return Some("Missing a target".to_string());
    }
    if job.sources.is_empty() || job.sources.iter().any(|s| s.trim().is_empty()) {
        return Some("Invalid source list".to_string());
    }

    if let Some(value) = job.setting("keep-versions") {
        if value.trim().parse::<u64>().is_err() {
            return Some(format!("Invalid value for keep-versions: {}", value));
        }
    }
    if let Some(value) = job.setting("keep-time") {
        if parse_timespan(value).is_none() {
            return Some(format!("Invalid value for keep-time: {}", value));
        }
    }
    if let Some(value) = job.setting("dblock-size") {
        if !size_pattern().is_match(value) {
            return Some(format!("Invalid value for dblock-size: {}", value));
        }
    }

    let encryption_disabled = match job.setting("no-encryption") {
        // 値なしのフラグは有効扱い
        Some(value) if value.trim().is_empty() => true,
        Some(value) => match parse_bool(value) {
            Some(disabled) => disabled,
            None => return Some(format!("Invalid value for no-encryption: {}", value)),
        },
        None => false,
    };
    if !encryption_disabled
        && job
            .setting("passphrase")
            .map_or(true, |p| p.trim().is_empty())
    {
        return Some("Missing passphrase".to_string());
    }

    for filter in &job.filters {
        let expression = filter.expression.trim();
        if expression.is_empty() {
            return Some("Empty filter expression".to_string());
        }
        if let Some(pattern) = expression
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if let Err(e) = Regex::new(pattern) {
                return Some(format!("Invalid filter expression {}: {}", expression, e));
            }
        }
    }

    None
}

fn validate_schedule(schedule: &Schedule) -> Option<String> {
    match parse_timespan(&schedule.repeat) {
        None => return Some("Invalid repetition time".to_string()),
        Some(repeat) if repeat < MIN_REPEAT => {
            return Some(format!(
                "Repetition time must be at least 5m: {}",
                schedule.repeat
            ))
        }
        Some(_) => {}
    }

    if let Some(time) = schedule.time.as_deref() {
        if !is_timestamp(time) {
            return Some(format!("Invalid schedule time: {}", time));
        }
    }

    if let Some(days) = schedule.allowed_week_days() {
        if let Some(day) = days.iter().find(|d| d.parse::<Weekday>().is_err()) {
            return Some(format!("Invalid weekday in schedule rule: {}", day));
        }
    }
    if let Some(day) = schedule
        .allowed_days
        .iter()
        .find(|d| d.trim().parse::<Weekday>().is_err())
    {
        return Some(format!("Invalid allowed day: {}", day));
    }

    None
}

fn is_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
}
