//! パスフレーズの入力
//!
//! - `JOB_IMPORT_PASSPHRASE` が設定されていればそれを使う
//! - 端末ならローモードで 1 文字ごとに `*` を表示し、Backspace で消去する
//! - 端末でなければ標準入力から 1 行読む
//!
//! プロンプトと伏字は標準エラーに出力する。

use crate::config::PASSPHRASE_ENV;
use crate::env::EnvVar;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::debug;
use zeroize::Zeroizing;

const MASK: &str = "*";
const ERASE: &str = "\x08 \x08";

/// キー入力の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// 1 文字追加した
    Mask,
    /// 1 文字削除した
    Erase,
    Ignore,
    Done,
    Cancel,
}

impl KeyOutcome {
    /// 端末へのエコー
    pub fn echo(self) -> Option<&'static str> {
        match self {
            KeyOutcome::Mask => Some(MASK),
            KeyOutcome::Erase => Some(ERASE),
            _ => None,
        }
    }
}

/// 入力中のパスフレーズ
#[derive(Default)]
pub struct PasswordInput {
    buffer: Zeroizing<String>,
}

impl PasswordInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーイベントを 1 つ反映
    pub fn apply(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Ignore;
        }
        let control = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Enter => KeyOutcome::Done,
            KeyCode::Char('c') | KeyCode::Char('C') if control => KeyOutcome::Cancel,
            KeyCode::Backspace => match self.buffer.pop() {
                Some(_) => KeyOutcome::Erase,
                None => KeyOutcome::Ignore,
            },
            KeyCode::Char(c) if !control && !c.is_control() => {
                self.buffer.push(c);
                KeyOutcome::Mask
            }
            _ => KeyOutcome::Ignore,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_secret(mut self) -> String {
        std::mem::take(&mut *self.buffer)
    }
}

/// ローモードのガード（ドロップ時に復元）
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// パスフレーズを取得
pub fn read_secret(prompt: &str) -> io::Result<String> {
    if let Some(secret) = EnvVar::get(PASSPHRASE_ENV) {
        debug!(source = PASSPHRASE_ENV, "using passphrase from environment");
        return Ok(secret);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let stdin = io::stdin();
    if stdin.is_terminal() {
        read_masked(&mut stderr)
    } else {
        read_line_from(stdin.lock())
    }
}

fn read_masked(out: &mut impl Write) -> io::Result<String> {
    let mut input = PasswordInput::new();

    let finished = {
        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let outcome = input.apply(key);
            if let Some(echo) = outcome.echo() {
                write!(out, "{}", echo)?;
                out.flush()?;
            }
            match outcome {
                KeyOutcome::Done => break Ok(()),
                KeyOutcome::Cancel => {
                    break Err(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "passphrase entry cancelled",
                    ))
                }
                _ => {}
            }
        }
    };
    writeln!(out)?;

    finished.map(|()| {
        debug!(chars = input.len(), "passphrase entered");
        input.into_secret()
    })
}

/// 1 行読み込み、末尾の改行を取り除く
fn read_line_from(mut reader: impl BufRead) -> io::Result<String> {
    let mut line = Zeroizing::new(String::new());
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no passphrase on standard input",
        ));
    }
    let len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(len);
    Ok(std::mem::take(&mut *line))
}
