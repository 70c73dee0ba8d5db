//! ServerQuery reply types.
//!
//! Every line the server sends is one of three shapes:
//!
//! ```text
//! error id=0 msg=ok                                   -> Reply::Status
//! notifyclientleftview cfid=1 ctid=0 clid=5           -> Reply::Notify
//! clid=1 client_nickname=Ann|clid=2 client_nickname=Bob  -> Reply::Data
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};
use crate::escape::{escape_to, unescape};

/// A single `key[=value]` record. Field order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    /// Parse one record (a space-separated list of `key=value` pairs).
    pub fn parse(s: &str) -> Self {
        let fields = s
            .split(' ')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (unescape(key), Some(unescape(value))),
                None => (unescape(part), None),
            })
            .collect();
        Self { fields }
    }

    /// Build a record from owned pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Value of the first field named `key`.
    ///
    /// Flags (keys without a value) and absent keys both return `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Parse the value of `key` with [`FromStr`].
    ///
    /// Returns `None` if the key is absent, `Some(Err)` if it does not parse.
    pub fn parse_field<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.get(key).map(str::parse)
    }

    /// Whether a field (value or flag) named `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            escape_to(f, key)?;
            if let Some(value) = value {
                f.write_str("=")?;
                escape_to(f, value)?;
            }
        }
        Ok(())
    }
}

fn parse_records(s: &str) -> Vec<Record> {
    s.split('|')
        .map(Record::parse)
        .filter(|r| !r.is_empty())
        .collect()
}

/// The `error` line that terminates every command response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    /// Numeric result code; `0` means success.
    pub id: u32,
    /// Human-readable message.
    pub msg: String,
    /// Optional extended message.
    pub extra_msg: Option<String>,
}

impl QueryStatus {
    /// Whether the command succeeded.
    pub fn is_ok(&self) -> bool {
        self.id == 0
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}: {}", self.id, self.msg)?;
        if let Some(extra) = &self.extra_msg {
            write!(f, " ({})", extra)?;
        }
        Ok(())
    }
}

/// An unsolicited `notify*` event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Event name without the `notify` prefix (e.g. `cliententerview`).
    pub event: String,
    /// One record per affected entity.
    pub records: Vec<Record>,
}

/// A parsed ServerQuery line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command terminator.
    Status(QueryStatus),
    /// Server event.
    Notify(Notification),
    /// Command response body.
    Data(Vec<Record>),
}

impl FromStr for Reply {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim_end_matches(['\r', '\n']);
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));

        if head == "error" {
            let record = Record::parse(rest);
            let id = match record.parse_field::<u32>("id") {
                Some(Ok(id)) => id,
                Some(Err(_)) => return Err(ProtocolError::invalid_reply(line, "non-numeric id")),
                None => return Err(ProtocolError::invalid_reply(line, "missing id")),
            };
            return Ok(Reply::Status(QueryStatus {
                id,
                msg: record.get("msg").unwrap_or_default().to_string(),
                extra_msg: record.get("extra_msg").map(str::to_string),
            }));
        }

        if let Some(event) = head.strip_prefix("notify") {
            if event.is_empty() || head.contains('=') {
                return Err(ProtocolError::invalid_reply(line, "notification without event name"));
            }
            return Ok(Reply::Notify(Notification {
                event: event.to_string(),
                records: parse_records(rest),
            }));
        }

        Ok(Reply::Data(parse_records(line)))
    }
}
