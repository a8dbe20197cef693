// src/types.rs - 核心数据类型

/// 加密类型（已归一化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Security {
    /// WPA / WPA2 / WPA3 统一归为 WPA
    Wpa,
    Wep,
    /// 开放网络，无密码
    Open,
    /// 无法识别的 T 字段，原样保留（已 trim + 大写）
    Other(String),
}

impl Security {
    /// 按 T 字段取值归一化；调用方需先 trim 并转大写
    pub fn from_token(token: &str) -> Self {
        match token {
            "WPA" | "WPA2" | "WPA3" => Security::Wpa,
            "WEP" => Security::Wep,
            "" | "NONE" | "NOPASS" => Security::Open,
            other => Security::Other(other.to_string()),
        }
    }

    pub fn needs_password(&self) -> bool {
        !matches!(self, Security::Open)
    }

    /// 二维码载荷 / JSON 结果中使用的取值
    pub fn token(&self) -> &str {
        match self {
            Security::Wpa => "WPA",
            Security::Wep => "WEP",
            Security::Open => "nopass",
            Security::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Security::Open => write!(f, "Open"),
            Security::Wep => write!(f, "WEP"),
            Security::Wpa => write!(f, "WPA"),
            Security::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Security {
    fn from(s: &str) -> Self {
        Security::from_token(&s.trim().to_uppercase())
    }
}

/// 从 WIFI: 载荷解析出的一组凭据，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredential {
    ssid: String,
    password: String,
    security: Security,
    hidden: bool,
    raw_payload: String,
}

impl WifiCredential {
    /// 手动构造（generate 子命令使用）。SSID 为空返回 None；开放网络强制清空密码
    pub fn new(
        ssid: impl Into<String>,
        password: impl Into<String>,
        security: Security,
        hidden: bool,
        raw_payload: impl Into<String>,
    ) -> Option<Self> {
        let ssid = ssid.into();
        if ssid.is_empty() {
            return None;
        }
        let password = if security == Security::Open {
            String::new()
        } else {
            password.into()
        };
        Some(Self {
            ssid,
            password,
            security,
            hidden,
            raw_payload: raw_payload.into(),
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn security(&self) -> &Security {
        &self.security
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn raw_payload(&self) -> &str {
        &self.raw_payload
    }
}
