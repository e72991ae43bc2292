use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

pub enum MessageLogMode {
    /// Log every fetch body in full.
    Full,
    /// Log a fetch body only when it differs from the previous one.
    Changed,
}

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_body: Option<Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_body: None,
        })
    }

    pub fn log_request(&mut self, method: &str, path: &str, body: Option<&Value>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "path": path,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, action: &str, step: &str, body: &Value) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "step": step,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_fetch(&mut self, status: u16, body: &Value) {
        if status != 200 {
            let entry = json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "fetch",
                "status": status,
                "body": body,
            });
            self.write_line(&entry);
            return;
        }

        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "fetch",
                    "status": status,
                    "body": body,
                });
                self.write_line(&entry);
            }
            MessageLogMode::Changed => {
                if self.previous_body.as_ref() == Some(body) {
                    let entry = json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "fetch",
                        "status": status,
                        "unchanged": true,
                    });
                    self.write_line(&entry);
                } else {
                    let entry = json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "fetch",
                        "status": status,
                        "body": body,
                    });
                    self.write_line(&entry);
                    self.previous_body = Some(body.clone());
                }
            }
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
