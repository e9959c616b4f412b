//! This module is intended to group everything that's "intrinsic" of ADB.
//!
//! `*Cmd` are thin wrappers around the ADB CLI, which implies:
//! - no "magic"
//! - no custom commands
//! - no chaining ("piping") of existing commands
//!
//! This guarantees a 1-to-1 mapping between methods and cmds.
//! Interpreting the output (permission grants, provider rows, ...) is the job
//! of the collaborator that issued the command, not of this module.
//!
//! If there's ever a need for an ADB feature which these APIs don't expose,
//! please extend them here rather than falling-back to a raw `Command`.
//!
//! For comprehensive info about ADB,
//! [see this](https://android.googlesource.com/platform/packages/modules/adb/+/refs/heads/master/docs/)

use regex::Regex;
use serde::{Deserialize, Serialize};
use static_init::dynamic;
use std::fmt;
use std::process::Command;

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

/// An enum to contain different variants for errors yielded by ADB.
#[derive(Debug, thiserror::Error)]
pub enum AdbError {
    #[error("cannot run ADB, likely not found: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
}

pub fn to_trimmed_utf8(v: &[u8]) -> String {
    String::from_utf8_lossy(v).trim_end().to_string()
}

/// Wraps `s` in single quotes for the device's `sh`.
///
/// `adb shell` joins its arguments with spaces and hands the result to `sh`,
/// so anything with `?`, `'`, spaces or parentheses must be quoted.
pub fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Builder for an ADB CLI command,
/// using the type-state and new-type patterns.
///
/// This is not intended to model the entire ADB API.
/// It only models the subset the settings screen needs.
///
/// [More info here](https://developer.android.com/tools/adb)
#[derive(Debug)]
pub struct Cmd(Command);
impl Cmd {
    pub fn new() -> Self {
        Self(Command::new("adb"))
    }
    /// `shell` sub-command.
    ///
    /// If `device_serial` is empty, it lets ADB choose the default device.
    pub fn sh<S: AsRef<str>>(mut self, device_serial: S) -> ShCmd {
        let serial = device_serial.as_ref();
        if !serial.is_empty() {
            self.0.args(["-s", serial]);
        }
        self.0.arg("shell");
        ShCmd(self)
    }
    fn run(self) -> Result<String, AdbError> {
        let mut cmd = self.0;
        #[cfg(target_os = "windows")]
        let cmd = cmd.creation_flags(0x0800_0000); // do not open a cmd window

        let o = cmd.output().map_err(|e| {
            error!("ADB: {e}");
            AdbError::Spawn(e)
        })?;
        let stdout = to_trimmed_utf8(&o.stdout);
        if o.status.success() {
            Ok(stdout)
        } else {
            let stderr = to_trimmed_utf8(&o.stderr);
            // ADB does really weird things:
            // Some errors are not redirected to `stderr`
            let err = if stdout.is_empty() { stderr } else { stdout };
            Err(AdbError::Failed(err))
        }
    }
    /// Like `run`, but also rejects a zero exit status whose output reports an error.
    ///
    /// `am` and `content` happily exit with `0` after printing
    /// `Error: Activity not started, ...` or a `Failure` line.
    fn run_checked(self) -> Result<String, AdbError> {
        let o = self.run()?;
        if o.lines()
            .any(|l| l.starts_with("Error") || l.contains("Failure") || l.contains("Exception"))
        {
            return Err(AdbError::Failed(o));
        }
        Ok(o)
    }
}

impl Default for Cmd {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a command that runs on the device's default `sh` implementation.
/// Typically MKSH, but could be Ash.
///
/// [More info](https://chromium.googlesource.com/aosp/platform/system/core/+/refs/heads/upstream/shell_and_utilities).
#[derive(Debug)]
pub struct ShCmd(Cmd);
impl ShCmd {
    pub fn pm(mut self) -> PmCmd {
        self.0 .0.arg("pm");
        PmCmd(self)
    }
    pub fn am(mut self) -> AmCmd {
        self.0 .0.arg("am");
        AmCmd(self)
    }
    pub fn content(mut self) -> ContentCmd {
        self.0 .0.arg("content");
        ContentCmd(self)
    }
    /// `dumpsys package <pack>`
    pub fn dumpsys_package(mut self, pack: &PackId) -> Result<String, AdbError> {
        self.0 .0.args(["dumpsys", "package", pack.as_str()]);
        self.0.run()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PackId(String);
impl PackId {
    /// Creates a package-ID if it's valid according to
    /// [this](https://developer.android.com/build/configure-app-module#set-application-id)
    pub fn new<S: AsRef<str>>(pid: S) -> Option<Self> {
        #[dynamic]
        static RE: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*(?:\.[a-zA-Z][a-zA-Z0-9_]*)+$")
            .unwrap_or_else(|_| unreachable!());

        let pid = pid.as_ref();

        if RE.is_match(pid) {
            Some(Self(pid.to_string()))
        } else {
            None
        }
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackId {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s).ok_or_else(|| format!("`{s}` is not a valid package name"))
    }
}

impl From<PackId> for String {
    fn from(p: PackId) -> Self {
        p.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `pm list packages` flag/state/type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmLsPackFlag {
    /// Only enabled
    E,
}
impl PmLsPackFlag {
    fn to_str(self) -> &'static str {
        match self {
            Self::E => "-e",
        }
    }
}

pub const PACK_URI_SCHEME: &str = "package:";

/// Builder for an Android Package Manager command.
///
/// [More info](https://developer.android.com/tools/adb#pm)
#[derive(Debug)]
pub struct PmCmd(ShCmd);
impl PmCmd {
    /// `list packages` sub-command, narrowed by `filter`.
    ///
    /// `pm` treats the filter as a substring, so callers that need an
    /// exact match must compare the returned names themselves.
    pub fn ls_packs(
        mut self,
        f: Option<PmLsPackFlag>,
        filter: &PackId,
    ) -> Result<Vec<String>, AdbError> {
        let cmd = &mut self.0 .0 .0;
        cmd.args(["list", "packages"]);
        if let Some(s) = f {
            cmd.arg(s.to_str());
        };
        cmd.arg(filter.as_str());
        self.0 .0.run().map(|pack_ls| {
            pack_ls
                .lines()
                .filter_map(|p_ln| p_ln.strip_prefix(PACK_URI_SCHEME))
                .map(String::from)
                .collect()
        })
    }
}

/// What `am start` should launch.
///
/// Only the handful of fields the settings screen needs; every value is
/// quoted for the device shell when the command is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub action: String,
    pub data: Option<String>,
    pub category: Option<String>,
    pub package: Option<PackId>,
}

impl Intent {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Self::default()
        }
    }
    #[must_use]
    pub fn data(mut self, uri: impl Into<String>) -> Self {
        self.data = Some(uri.into());
        self
    }
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
    #[must_use]
    pub fn package(mut self, pack: PackId) -> Self {
        self.package = Some(pack);
        self
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if let Some(d) = &self.data {
            write!(f, " dat={d}")?;
        }
        if let Some(p) = &self.package {
            write!(f, " pkg={p}")?;
        }
        Ok(())
    }
}

/// Builder for an Activity Manager command.
///
/// [More info](https://developer.android.com/tools/adb#am)
#[derive(Debug)]
pub struct AmCmd(ShCmd);
impl AmCmd {
    /// `start` sub-command, always with `FLAG_ACTIVITY_NEW_TASK`.
    pub fn start(mut self, intent: &Intent) -> Result<String, AdbError> {
        let cmd = &mut self.0 .0 .0;
        cmd.args(["start", "-f", "0x10000000", "-a"]);
        cmd.arg(sh_quote(&intent.action));
        if let Some(c) = &intent.category {
            cmd.arg("-c").arg(sh_quote(c));
        }
        if let Some(d) = &intent.data {
            cmd.arg("-d").arg(sh_quote(d));
        }
        if let Some(p) = &intent.package {
            cmd.arg(p.as_str());
        }
        self.0 .0.run_checked()
    }
}

/// Builder for a content-provider command.
///
/// [More info](https://android.googlesource.com/platform/frameworks/base/+/refs/heads/main/cmds/content/)
#[derive(Debug)]
pub struct ContentCmd(ShCmd);
impl ContentCmd {
    /// `query --uri <uri> --projection <col> [--where <clause>]`
    pub fn query(
        mut self,
        uri: &str,
        projection: &str,
        where_clause: Option<&str>,
    ) -> Result<String, AdbError> {
        let cmd = &mut self.0 .0 .0;
        cmd.args(["query", "--uri", uri, "--projection", projection]);
        if let Some(w) = where_clause {
            cmd.arg("--where").arg(sh_quote(w));
        }
        self.0 .0.run_checked()
    }
    /// `delete --uri <uri> --where <clause>`
    pub fn delete(mut self, uri: &str, where_clause: &str) -> Result<String, AdbError> {
        let cmd = &mut self.0 .0 .0;
        cmd.args(["delete", "--uri", uri, "--where"]);
        cmd.arg(sh_quote(where_clause));
        self.0 .0.run_checked()
    }
}
