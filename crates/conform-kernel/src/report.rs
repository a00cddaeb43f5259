//! Report rendering: streaming TAP 14 and a JSON summary of the same run.

use crate::runner::{CheckOutcome, RunSummary};
use serde_json::{Value, json};
use std::io::{self, Write};

pub const TAP_VERSION_LINE: &str = "TAP version 14";
pub const REPORT_KIND: &str = "conform.report.v1";

/// Escape a message for the double-quoted `message:` field.
pub fn quote_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 2);
    out.push('"');
    for ch in message.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Line-at-a-time TAP output. The plan must be written before any result.
pub struct TapWriter<W: Write> {
    out: W,
}

impl<W: Write> TapWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn plan(&mut self, total: usize) -> io::Result<()> {
        writeln!(self.out, "{TAP_VERSION_LINE}")?;
        writeln!(self.out, "1..{total}")
    }

    pub fn ok(&mut self, id: usize, description: &str) -> io::Result<()> {
        writeln!(self.out, "ok {id} - {description}")
    }

    pub fn not_ok(&mut self, id: usize, description: &str, message: &str) -> io::Result<()> {
        writeln!(self.out, "not ok {id} - {description}")?;
        writeln!(self.out, "  ---")?;
        writeln!(self.out, "  message: {}", quote_message(message))?;
        writeln!(self.out, "  ...")
    }

    pub fn result(&mut self, row: &CheckOutcome) -> io::Result<()> {
        match row.outcome.message() {
            None => self.ok(row.id, &row.description),
            Some(message) => self.not_ok(row.id, &row.description, &message),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// The JSON form of a finished run.
pub fn summary_json(summary: &RunSummary, variant: &str) -> Value {
    let result = if summary.is_success() {
        "accepted"
    } else {
        "rejected"
    };
    json!({
        "schema": 1,
        "reportKind": REPORT_KIND,
        "variant": variant,
        "result": result,
        "total": summary.total(),
        "passed": summary.passed(),
        "failed": summary.failed(),
        "crashed": summary.crashed(),
        "checks": summary.outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Outcome;

    #[test]
    fn quotes_escape_block_breaking_characters() {
        assert_eq!(quote_message("plain"), "\"plain\"");
        assert_eq!(quote_message("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_message("a\nb"), "\"a\\nb\"");
        assert_eq!(quote_message("c:\\x"), "\"c:\\\\x\"");
    }

    #[test]
    fn tap_block_shape() {
        let mut buf = Vec::new();
        {
            let mut tap = TapWriter::new(&mut buf);
            tap.plan(2).expect("write");
            tap.ok(1, "first").expect("write");
            tap.not_ok(2, "second", "broke").expect("write");
        }
        insta::assert_snapshot!(String::from_utf8(buf).expect("utf8"), @r#"
TAP version 14
1..2
ok 1 - first
not ok 2 - second
  ---
  message: "broke"
  ...
"#);
    }

    #[test]
    fn json_summary_lists_outcomes() {
        let summary = RunSummary {
            outcomes: vec![
                CheckOutcome {
                    id: 1,
                    description: "one".to_string(),
                    outcome: Outcome::Passed,
                },
                CheckOutcome {
                    id: 2,
                    description: "two".to_string(),
                    outcome: Outcome::Failed("bad".to_string()),
                },
            ],
        };
        let payload = summary_json(&summary, "browser");
        assert_eq!(payload["result"], "rejected");
        assert_eq!(payload["total"], 2);
        assert_eq!(payload["failed"], 1);
        assert_eq!(payload["checks"][0]["status"], "passed");
        assert_eq!(payload["checks"][1]["status"], "failed");
        assert_eq!(payload["checks"][1]["message"], "bad");
        assert_eq!(payload["checks"][1]["id"], 2);
    }
}
