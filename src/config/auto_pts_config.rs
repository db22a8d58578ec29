//! Represents the `auto_pts` section of a project record.
//!
//! These are the settings handed to the AutoPTS client for one bot run.
//!
//! # Fields
//!
//! - `server_ip` / `srv_port`: PTS automation servers, parallel-indexed.
//! - `local_ip` / `cli_port`: callback addresses of the client, parallel-indexed with the servers.
//! - `project_path`: path of the IUT source tree.
//! - `workspace`: PTS workspace name or `.pqw6` path on the server machine.
//! - `board`: DUT board name, selects the reset command.
//! - `enable_max_logs`: run test cases with PTS maximum logging.
//! - `retry`: maximum repeat count of a failed test case.
//! - `bd_addr`: Bluetooth device address of the IUT, empty when auto-detected.
//! - `recovery`: let the server try to recover after an exception.
//! - `superguard`: minutes after which the watchdog blindly triggers recovery.
//! - `stress_test`: repeat passing test cases as well.
//! - `ykush`: YKUSH downstream port that power-cycles the IUT on BTP timeout.
//! - `hci`: HCI controller number, for native builds.
//! - `tty_file` / `debugger_snr`: serial port and J-Link serial of a hardware IUT.
//! - `rtt_log` / `btmon`: capture IUT logs or btsnoop over RTT.
//! - `test_cases` / `excluded`: test-case name prefixes to run and to skip.
//!
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::FieldViolation;

/// Default PTS automation server port.
pub const SERVER_PORT: u16 = 65000;
/// Default PTS automation client (callback) port.
pub const CLIENT_PORT: u16 = 65001;
/// Superguard used when a record does not set one.
pub const DEFAULT_SUPERGUARD_MINUTES: u32 = 15;

static BD_ADDR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(:?[0-9A-Fa-f]{2}){5}$").expect("bd_addr pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoPtsConfig {
    #[serde(default)]
    pub server_ip: Vec<IpAddr>,
    #[serde(default)]
    pub local_ip: Vec<IpAddr>,
    #[serde(default = "default_cli_port")]
    pub cli_port: Vec<u16>,
    #[serde(default = "default_srv_port")]
    pub srv_port: Vec<u16>,
    pub project_path: PathBuf,
    pub workspace: String,
    pub board: String,
    #[serde(default)]
    pub enable_max_logs: bool,
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub stress_test: bool,
    #[serde(default)]
    pub bd_addr: String,
    #[serde(default)]
    pub recovery: bool,
    #[serde(default = "default_superguard")]
    pub superguard: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ykush: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hci: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tty_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugger_snr: Option<String>,
    #[serde(default)]
    pub rtt_log: bool,
    #[serde(default)]
    pub btmon: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
}

/// How the client reaches the IUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IutLink<'a> {
    /// BTP over a serial port of a hardware board.
    Tty(&'a str),
    /// Native build attached to an HCI controller.
    Hci(u32),
    /// Emulated IUT (QEMU).
    Emulated,
}

fn default_cli_port() -> Vec<u16> {
    vec![CLIENT_PORT]
}

fn default_srv_port() -> Vec<u16> {
    vec![SERVER_PORT]
}

fn default_superguard() -> u32 {
    DEFAULT_SUPERGUARD_MINUTES
}

impl AutoPtsConfig {
    /// 未给出地址时，按端口数量补齐 127.0.0.1
    pub fn fill_defaults(&mut self) {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        if self.server_ip.is_empty() {
            self.server_ip = vec![localhost; self.srv_port.len()];
        }
        if self.local_ip.is_empty() {
            self.local_ip = vec![localhost; self.cli_port.len()];
        }
    }

    pub fn validate(&self) -> Result<(), FieldViolation> {
        if self.srv_port.is_empty() {
            return Err(FieldViolation::new("srv_port", "must list at least one port"));
        }
        let n = self.srv_port.len();
        let parallel = [
            ("server_ip", self.server_ip.len()),
            ("cli_port", self.cli_port.len()),
            ("local_ip", self.local_ip.len()),
        ];
        for (field, len) in parallel {
            if len != n {
                return Err(FieldViolation::new(
                    field,
                    format!("has {len} entries but srv_port has {n}"),
                ));
            }
        }
        if let Some(pos) = self.srv_port.iter().position(|p| *p == 0) {
            return Err(FieldViolation::new(format!("srv_port[{pos}]"), "must be non-zero"));
        }
        if let Some(pos) = self.cli_port.iter().position(|p| *p == 0) {
            return Err(FieldViolation::new(format!("cli_port[{pos}]"), "must be non-zero"));
        }
        if self.superguard == 0 {
            return Err(FieldViolation::new("superguard", "must be greater than zero"));
        }
        if self.workspace.trim().is_empty() {
            return Err(FieldViolation::new("workspace", "must not be empty"));
        }
        if self.board.trim().is_empty() {
            return Err(FieldViolation::new("board", "must not be empty"));
        }
        let optional_strings = [
            ("ykush", &self.ykush),
            ("tty_file", &self.tty_file),
            ("debugger_snr", &self.debugger_snr),
        ];
        for (field, value) in optional_strings {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(FieldViolation::new(field, "must not be empty when set"));
            }
        }
        if let Some(pos) = self.test_cases.iter().position(|tc| tc.trim().is_empty()) {
            return Err(FieldViolation::new(format!("test_cases[{pos}]"), "must not be empty"));
        }
        if let Some(pos) = self.excluded.iter().position(|tc| tc.trim().is_empty()) {
            return Err(FieldViolation::new(format!("excluded[{pos}]"), "must not be empty"));
        }
        if !self.bd_addr.is_empty() && !BD_ADDR_RE.is_match(&self.bd_addr) {
            return Err(FieldViolation::new(
                "bd_addr",
                format!("`{}` is not a Bluetooth device address", self.bd_addr),
            ));
        }
        Ok(())
    }

    /// Watchdog ceiling of a single test-case run.
    pub fn superguard_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.superguard) * 60)
    }

    /// Whether a test case is selected for this project.
    ///
    /// Names match by prefix. `excluded` wins over `test_cases`, and an empty
    /// `test_cases` list selects everything not excluded.
    pub fn runs_test_case(&self, name: &str) -> bool {
        if self.excluded.iter().any(|prefix| name.starts_with(prefix.as_str())) {
            return false;
        }
        self.test_cases.is_empty() || self.test_cases.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// 串口优先于 HCI，两者都没有时使用模拟器
    pub fn iut_link(&self) -> IutLink<'_> {
        match (&self.tty_file, self.hci) {
            (Some(tty), _) => IutLink::Tty(tty.as_str()),
            (None, Some(hci)) => IutLink::Hci(hci),
            (None, None) => IutLink::Emulated,
        }
    }

    /// (server, server port, local, client port) for every PTS instance.
    pub fn pts_endpoints(&self) -> impl Iterator<Item = (IpAddr, u16, IpAddr, u16)> + '_ {
        self.server_ip
            .iter()
            .zip(&self.srv_port)
            .zip(self.local_ip.iter().zip(&self.cli_port))
            .map(|((srv, srv_port), (local, cli_port))| (*srv, *srv_port, *local, *cli_port))
    }
}
