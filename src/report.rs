// src/report.rs - 解析结果，供终端 / JSON 输出

use crate::parse::{parse, ParseError};
use crate::types::WifiCredential;
use serde::Serialize;

/// `{success, ssid, password, security, hidden, raw_data}` 或
/// `{success: false, error, raw_data}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub raw_data: String,
}

impl ScanReport {
    /// 解析并生成报告，解析失败不会 panic 也不会向上传播
    pub fn scan(raw: &str) -> (Self, Option<WifiCredential>) {
        match parse(raw) {
            Ok(cred) => (Self::success(&cred), Some(cred)),
            Err(e) => (Self::failure(&e, raw), None),
        }
    }

    pub fn success(cred: &WifiCredential) -> Self {
        Self {
            success: true,
            ssid: Some(cred.ssid().to_string()),
            password: Some(cred.password().to_string()),
            security: Some(cred.security().token().to_string()),
            hidden: Some(cred.hidden()),
            error: None,
            raw_data: cred.raw_payload().to_string(),
        }
    }

    pub fn failure(err: &ParseError, raw: &str) -> Self {
        Self {
            success: false,
            ssid: None,
            password: None,
            security: None,
            hidden: None,
            error: Some(format!("Wi-Fi 二维码解析失败: {err}")),
            raw_data: raw.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.success {
            writeln!(f, "❌ 解析失败")?;
            writeln!(f)?;
            writeln!(f, "详情: {}", self.error.as_deref().unwrap_or("未知错误"))?;
            return write!(f, "原始数据: {}", self.raw_data);
        }

        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => "无",
        };
        writeln!(f, "✅ 检测到 Wi-Fi 二维码")?;
        writeln!(f)?;
        writeln!(f, "📶 SSID     : {}", self.ssid.as_deref().unwrap_or_default())?;
        writeln!(f, "🔐 密码     : {password}")?;
        writeln!(f, "🛡️ 安全     : {}", self.security.as_deref().unwrap_or_default())?;
        writeln!(
            f,
            "👁️ 隐藏网络 : {}",
            if self.hidden.unwrap_or(false) { "是" } else { "否" }
        )?;
        writeln!(f)?;
        write!(f, "📋 原始数据: {}", self.raw_data)
    }
}
