//! ServerQuery command construction.

use std::fmt;

use crate::escape::escape_to;

/// A ServerQuery command line.
///
/// Arguments are escaped on serialization, so callers pass raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<(String, String)>,
    options: Vec<String>,
}

impl Command {
    /// Create a command with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Append a `key=value` argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.args.push((key.into(), value.to_string()));
        self
    }

    /// Append a `-option` switch.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Command name (e.g. `clientlist`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `login client_login_name=.. client_login_password=..`
    pub fn login(user: &str, password: &str) -> Self {
        Self::new("login")
            .arg("client_login_name", user)
            .arg("client_login_password", password)
    }

    /// `use sid=..`
    pub fn use_server(server_id: u32) -> Self {
        Self::new("use").arg("sid", server_id)
    }

    /// `whoami`
    pub fn whoami() -> Self {
        Self::new("whoami")
    }

    /// `servernotifyregister event=server`
    ///
    /// Subscribes to client enter/leave events for the whole virtual server.
    pub fn register_server_events() -> Self {
        Self::new("servernotifyregister").arg("event", "server")
    }

    /// `clientlist`
    pub fn client_list() -> Self {
        Self::new("clientlist")
    }

    /// `clientgetnamefromdbid cldbid=..`
    pub fn client_name_from_dbid(database_id: u64) -> Self {
        Self::new("clientgetnamefromdbid").arg("cldbid", database_id)
    }

    /// `serveredit key=value`
    pub fn server_edit(key: &str, value: &str) -> Self {
        Self::new("serveredit").arg(key, value)
    }

    /// `version`; a cheap command used as keepalive.
    pub fn version() -> Self {
        Self::new("version")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        escape_to(f, &self.name)?;
        for (key, value) in &self.args {
            f.write_str(" ")?;
            escape_to(f, key)?;
            f.write_str("=")?;
            escape_to(f, value)?;
        }
        for option in &self.options {
            f.write_str(" -")?;
            escape_to(f, option)?;
        }
        Ok(())
    }
}
