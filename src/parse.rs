// src/parse.rs - WIFI: 二维码载荷解析

use crate::types::{Security, WifiCredential};
use std::collections::HashMap;
use thiserror::Error;

const SCHEME: &str = "WIFI:";

/// 反斜杠之后会被转义的字符
const ESCAPABLE: [char; 5] = [';', ':', ',', '\\', '"'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("不是 Wi-Fi 二维码（缺少 WIFI: 前缀）")]
    NotWifiScheme,
    #[error("二维码中没有 SSID")]
    MissingSsid,
}

/// 扫描器状态
#[derive(Debug)]
enum Scan {
    /// 尚未遇到 ':'，缓冲区积累的是键名
    SeekingKey,
    /// 键已确定，缓冲区积累的是值
    Value { key: String },
    /// 刚读到 '\'，key 记录转义结束后要回到的状态
    Escaped { key: Option<String> },
}

impl Scan {
    fn resume(key: Option<String>) -> Self {
        match key {
            Some(key) => Scan::Value { key },
            None => Scan::SeekingKey,
        }
    }
}

/// 解析 WIFI: 载荷
pub fn parse(raw: &str) -> Result<WifiCredential, ParseError> {
    let body = raw.strip_prefix(SCHEME).ok_or(ParseError::NotWifiScheme)?;
    let fields = scan_fields(body);

    let ssid = field(&fields, "S").unwrap_or("");
    let password = field(&fields, "P").unwrap_or("");
    let token = field(&fields, "T").unwrap_or("WPA").to_uppercase();
    let hidden = field(&fields, "H").is_some_and(|h| h.to_lowercase() == "true");

    if ssid.is_empty() {
        return Err(ParseError::MissingSsid);
    }

    let security = Security::from_token(&token);
    WifiCredential::new(ssid, password, security, hidden, raw).ok_or(ParseError::MissingSsid)
}

fn field<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields.get(key).map(|v| v.trim())
}

/// 逐字符扫描 `key:value;` 字段。重复键以首次出现为准
fn scan_fields(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let mut buf = String::new();
    let mut state = Scan::SeekingKey;

    for c in body.chars() {
        state = match state {
            Scan::Escaped { key } if ESCAPABLE.contains(&c) => {
                buf.push(c);
                Scan::resume(key)
            }
            // 不认识的转义：反斜杠按字面保留，当前字符照常处理
            Scan::Escaped { key } => {
                buf.push('\\');
                step(Scan::resume(key), c, &mut buf, &mut fields)
            }
            other => step(other, c, &mut buf, &mut fields),
        };
    }

    // 末尾孤立的反斜杠
    if let Scan::Escaped { key } = state {
        buf.push('\\');
        state = Scan::resume(key);
    }

    // 没有以 ';' 结尾的最后一个字段；空值不提交
    if let Scan::Value { key } = state {
        if !buf.is_empty() {
            commit(&mut fields, key, buf);
        }
    }

    fields
}

fn step(state: Scan, c: char, buf: &mut String, fields: &mut HashMap<String, String>) -> Scan {
    match (state, c) {
        (Scan::SeekingKey, ':') => Scan::Value {
            key: std::mem::take(buf),
        },
        (Scan::Value { key }, ';') => {
            commit(fields, key, std::mem::take(buf));
            Scan::SeekingKey
        }
        // 没有键的片段直接丢弃
        (Scan::SeekingKey, ';') => {
            buf.clear();
            Scan::SeekingKey
        }
        (Scan::SeekingKey, '\\') => Scan::Escaped { key: None },
        (Scan::Value { key }, '\\') => Scan::Escaped { key: Some(key) },
        (state, c) => {
            buf.push(c);
            state
        }
    }
}

fn commit(fields: &mut HashMap<String, String>, key: String, value: String) {
    if key.is_empty() {
        return;
    }
    fields.entry(key).or_insert(value);
}
