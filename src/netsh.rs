// src/netsh.rs - 所有 netsh wlan 调用封装

use crate::config::Config;
use crate::store::{CommandOutput, NetworkProfileStore, StoreError};
use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::process::Command;

/// 基于 `netsh wlan` 的 profile 存储
#[derive(Debug, Clone)]
pub struct NetshStore {
    profile_dir: PathBuf,
    interface: Option<String>,
}

impl NetshStore {
    pub fn new(cfg: &Config) -> Self {
        Self {
            profile_dir: cfg.profile_dir(),
            interface: cfg.interface.clone(),
        }
    }
}

#[async_trait]
impl NetworkProfileStore for NetshStore {
    async fn register(&self, profile_xml: &str) -> Result<CommandOutput, StoreError> {
        ensure_windows()?;
        // 命令结束后（无论成败）guard 负责删除临时文件
        let file = TempProfile::write(&self.profile_dir, profile_xml).await?;
        let filename = format!("filename={}", file.path().display());
        run(&["wlan", "add", "profile", filename.as_str()]).await
    }

    async fn connect(&self, ssid: &str) -> Result<CommandOutput, StoreError> {
        ensure_windows()?;
        let name = format!("name={ssid}");
        let iface = self.interface.as_ref().map(|i| format!("interface={i}"));
        let mut args = vec!["wlan", "connect", name.as_str()];
        if let Some(i) = &iface {
            args.push(i.as_str());
        }
        run(&args).await
    }
}

fn ensure_windows() -> Result<(), StoreError> {
    if cfg!(windows) {
        Ok(())
    } else {
        Err(StoreError::Unsupported)
    }
}

/// 执行 netsh，参数逐个传递（不经过 shell）
async fn run(args: &[&str]) -> Result<CommandOutput, StoreError> {
    debug!("netsh {}", args.join(" "));
    let out = Command::new("netsh").args(args).output().await?;
    into_result(args, out)
}

fn into_result(args: &[&str], out: Output) -> Result<CommandOutput, StoreError> {
    if out.status.success() {
        Ok(CommandOutput {
            message: String::from_utf8_lossy(&out.stdout).trim().to_string(),
        })
    } else {
        // netsh 常把错误写到 stdout
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(StoreError::CommandFailed {
            command: format!("netsh {}", args.iter().take(3).copied().collect::<Vec<_>>().join(" ")),
            code: out.status.code(),
            stderr,
        })
    }
}

// ── 临时 profile 文件 ─────────────────────────────────────────

/// 写入磁盘的 profile，drop 时删除
#[derive(Debug)]
struct TempProfile {
    path: PathBuf,
}

impl TempProfile {
    async fn write(dir: &Path, xml: &str) -> std::io::Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = dir.join(format!("wifi-qr-{}-{nanos}.xml", std::process::id()));
        tokio::fs::write(&path, xml).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempProfile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("无法删除临时 profile {}: {e}", self.path.display());
        }
    }
}

// ── 查询当前网络 ─────────────────────────────────────────────

/// 当前已连接网络的 (SSID, 密码)。未连接返回 None；密码读不到时为空串
pub async fn current_credentials() -> Result<Option<(String, String)>, StoreError> {
    ensure_windows()?;
    let out = Command::new("netsh")
        .args(["wlan", "show", "interfaces"])
        .output()
        .await?;
    let ssid = match interface_ssid(&String::from_utf8_lossy(&out.stdout)) {
        Some(s) => s,
        None => return Ok(None),
    };

    let name = format!("name={ssid}");
    let out = Command::new("netsh")
        .args(["wlan", "show", "profile", name.as_str(), "key=clear"])
        .output()
        .await?;
    let password = key_content(&String::from_utf8_lossy(&out.stdout)).unwrap_or_default();
    Ok(Some((ssid, password)))
}

/// 从 `netsh wlan show interfaces` 输出中取 SSID（跳过 BSSID 行）
fn interface_ssid(text: &str) -> Option<String> {
    text.lines()
        .find(|l| l.contains("SSID") && !l.contains("BSSID"))
        .and_then(value_after_colon)
        .filter(|s| !s.is_empty())
}

/// 从 `netsh wlan show profile … key=clear` 输出中取密码
fn key_content(text: &str) -> Option<String> {
    text.lines()
        .find(|l| l.contains("Key Content"))
        .and_then(value_after_colon)
}

/// "    SSID                   : My:Net" → "My:Net"
fn value_after_colon(line: &str) -> Option<String> {
    line.split_once(':').map(|(_, v)| v.trim().to_string())
}
