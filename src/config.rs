// src/config.rs - 配置加载，支持文件覆盖

use anyhow::{Context, Result};
use qrcode::EcLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认日志级别（RUST_LOG 优先）
    pub log_level: String,
    /// 默认以 JSON 输出解析结果
    pub json: bool,
    /// netsh wlan connect 使用的网卡名，None 交给系统选择
    pub interface: Option<String>,
    /// 临时 profile 文件存放目录，None 使用系统临时目录
    pub profile_dir: Option<PathBuf>,
    /// 二维码纠错等级: L / M / Q / H
    pub qr_ec_level: String,
    /// 二维码四周留白
    pub qr_quiet_zone: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            json: false,
            interface: None,
            profile_dir: None,
            qr_ec_level: "M".into(),
            qr_quiet_zone: true,
        }
    }
}

impl Config {
    /// 按优先级查找并加载配置文件
    pub fn load() -> Result<Self> {
        for path in &config_candidates() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Config::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("配置文件格式错误 {}", path.display()))?;
        Ok(cfg)
    }

    /// 临时 profile 文件目录
    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// 注册 + 连接 的跨进程锁文件，按网卡区分
    pub fn lock_path(&self) -> PathBuf {
        let iface: String = self
            .interface
            .as_deref()
            .unwrap_or("default")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.profile_dir().join(format!("wifi-qr-{iface}.lock"))
    }

    /// 无法识别的纠错等级回退到 M
    pub fn ec_level(&self) -> EcLevel {
        match self.qr_ec_level.trim().to_uppercase().as_str() {
            "L" => EcLevel::L,
            "Q" => EcLevel::Q,
            "H" => EcLevel::H,
            _ => EcLevel::M,
        }
    }
}

fn config_candidates() -> Vec<PathBuf> {
    let mut v = vec![];
    // 同目录下的 config.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            v.push(dir.join("config.toml"));
        }
    }
    // ~/.config/wifi-qr/config.toml（Windows 下为 %APPDATA%\wifi-qr）
    if let Some(dir) = dirs::config_dir() {
        v.push(dir.join("wifi-qr").join("config.toml"));
    }
    v
}
