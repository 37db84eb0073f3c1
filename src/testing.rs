//! テスト用のフィクスチャ

use crate::bundle::envelope::{self, TEST_KDF};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// エクスポートされたバンドルの JSON（移行不可フィールドを含む）
pub fn export_document(name: &str) -> Value {
    json!({
        "CreatedByUsername": "alice",
        "DisplayNames": { "/home/alice/": "alice" },
        "Backup": {
            "ID": "42",
            "Name": name,
            "Description": "exported from another machine",
            "Tags": [],
            "TargetURL": "file:///mnt/backup/nightly",
            "DBPath": "/home/alice/.config/app/QWERTYUIOP.sqlite",
            "Sources": ["/home/alice/"],
            "Settings": [
                { "Filter": "", "Name": "encryption-module", "Value": "aes", "Argument": false },
                { "Filter": "", "Name": "passphrase", "Value": "backup-pass", "Argument": false },
                { "Filter": "", "Name": "--keep-versions", "Value": "5", "Argument": true }
            ],
            "Filters": [
                { "Order": 0, "Include": false, "Expression": "*.tmp" }
            ],
            "Metadata": {
                "LastBackupDate": "20190101T000000Z",
                "SourceFilesSize": "1024"
            }
        },
        "Schedule": {
            "ID": 9,
            "Tags": ["ID=42"],
            "Time": "2019-05-10T01:00:00Z",
            "Repeat": "1D",
            "LastRun": "2019-05-09T01:00:00Z",
            "Rule": "AllowedWeekDays=Monday,Tuesday,Wednesday,Thursday,Friday",
            "AllowedDays": []
        }
    })
}

/// 平文バンドルを書き出す
pub fn write_plain_bundle(dir: &Path, document: &Value) -> PathBuf {
    let path = dir.join("bundle.json");
    std::fs::write(&path, serde_json::to_vec_pretty(document).unwrap()).unwrap();
    path
}

/// 暗号化バンドルを書き出す
pub fn write_sealed_bundle(dir: &Path, document: &Value, secret: &str) -> PathBuf {
    let path = dir.join("bundle.json.jbx");
    let plaintext = serde_json::to_vec(document).unwrap();
    let sealed = envelope::seal_with(&plaintext, secret, TEST_KDF).unwrap();
    std::fs::write(&path, sealed).unwrap();
    path
}

/// 呼ばれてはならないパスフレーズ提供関数
pub fn no_secret() -> std::io::Result<String> {
    panic!("secret provider must not be called for this bundle")
}
