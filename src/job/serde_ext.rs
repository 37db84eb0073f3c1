//! エクスポート形式の緩い値を受け付けるデシリアライザ

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` をデフォルト値として扱う
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// ID は文字列・数値のどちらでも受け付け、文字列に正規化する
pub(crate) fn loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    };
    Ok(id)
}
