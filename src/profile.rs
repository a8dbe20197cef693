// src/profile.rs - 生成 Windows WLAN profile XML（netsh wlan add profile 使用）

use crate::types::{Security, WifiCredential};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

const NAMESPACE: &str = "http://www.microsoft.com/networking/WLAN/profile/v1";

#[derive(Debug, Error)]
pub enum ProfileError {
    /// XML 1.0 不允许出现的字符（如 U+0001、U+001B），无法写入文档
    #[error("{field} 含有 XML 不允许的字符 U+{code:04X}")]
    InvalidChar { field: &'static str, code: u32 },
    #[error("XML 写入失败: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// 认证方式、加密方式，以及可选的 (keyType, keyMaterial)
struct SecurityBlock<'a> {
    authentication: &'static str,
    encryption: &'static str,
    shared_key: Option<(&'static str, &'a str)>,
}

impl<'a> SecurityBlock<'a> {
    fn for_credential(cred: &'a WifiCredential) -> Self {
        match cred.security() {
            Security::Open => Self {
                authentication: "open",
                encryption: "none",
                shared_key: None,
            },
            Security::Wep => Self {
                authentication: "open",
                encryption: "WEP",
                shared_key: Some(("networkKey", cred.password())),
            },
            // 未识别的类型也按 WPA2-PSK 处理
            Security::Wpa | Security::Other(_) => Self {
                authentication: "WPA2PSK",
                encryption: "AES",
                shared_key: Some(("passPhrase", cred.password())),
            },
        }
    }
}

/// 把凭据序列化为完整的 WLAN profile 文档。
/// 文本由 quick-xml 转义；SSID / 密码含 XML 1.0 禁止的控制字符时返回错误
pub fn encode(cred: &WifiCredential) -> Result<String, ProfileError> {
    check_chars("SSID", cred.ssid())?;
    check_chars("password", cred.password())?;

    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_profile(&mut w, cred)?;
    // 输入全部来自 &str，输出必然是合法 UTF-8
    Ok(String::from_utf8_lossy(&w.into_inner()).into_owned())
}

fn write_profile(w: &mut Writer<Vec<u8>>, cred: &WifiCredential) -> quick_xml::Result<()> {
    let sec = SecurityBlock::for_credential(cred);
    let hex = hex::encode_upper(cred.ssid().as_bytes());

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(
        BytesStart::new("WLANProfile").with_attributes([("xmlns", NAMESPACE)]),
    ))?;
    leaf(w, "name", cred.ssid())?;

    open(w, "SSIDConfig")?;
    open(w, "SSID")?;
    leaf(w, "hex", &hex)?;
    leaf(w, "name", cred.ssid())?;
    close(w, "SSID")?;
    if cred.hidden() {
        leaf(w, "nonBroadcast", "true")?;
    }
    close(w, "SSIDConfig")?;

    leaf(w, "connectionType", "ESS")?;
    leaf(w, "connectionMode", "auto")?;

    open(w, "MSM")?;
    open(w, "security")?;
    open(w, "authEncryption")?;
    leaf(w, "authentication", sec.authentication)?;
    leaf(w, "encryption", sec.encryption)?;
    leaf(w, "useOneX", "false")?;
    close(w, "authEncryption")?;
    if let Some((key_type, material)) = sec.shared_key {
        open(w, "sharedKey")?;
        leaf(w, "keyType", key_type)?;
        leaf(w, "protected", "false")?;
        leaf(w, "keyMaterial", material)?;
        close(w, "sharedKey")?;
    }
    close(w, "security")?;
    close(w, "MSM")?;

    close(w, "WLANProfile")
}

fn open(w: &mut Writer<Vec<u8>>, name: &str) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close(w: &mut Writer<Vec<u8>>, name: &str) -> quick_xml::Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `<name>text</name>`，文本原样写入（只做实体转义）
fn leaf(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> quick_xml::Result<()> {
    open(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    close(w, name)
}

/// XML 1.0 Char 产生式：除 \t \n \r 外的 C0 控制字符以及 U+FFFE / U+FFFF 不可出现
fn check_chars(field: &'static str, s: &str) -> Result<(), ProfileError> {
    match s
        .chars()
        .find(|&c| (c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')) || matches!(c, '\u{FFFE}' | '\u{FFFF}'))
    {
        Some(c) => Err(ProfileError::InvalidChar {
            field,
            code: c as u32,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use quick_xml::Reader;

    /// 用 quick-xml 读回文档，返回每个叶子元素的 (路径, 文本)。
    /// 文档不合法（标签不配对等）时直接 panic
    fn leaves(xml: &str) -> Vec<(String, String)> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<String> = vec![];
        let mut text = String::new();
        let mut is_leaf = false;
        let mut out = vec![];
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    stack.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
                    text.clear();
                    is_leaf = true;
                }
                Event::Text(t) => text.push_str(&t.unescape().unwrap()),
                Event::End(_) => {
                    if is_leaf {
                        out.push((stack.join("/"), text.clone()));
                    }
                    stack.pop();
                    text.clear();
                    is_leaf = false;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        assert!(stack.is_empty(), "unclosed elements: {stack:?}");
        out
    }

    fn text_of(xml: &str, path: &str) -> Option<String> {
        let path = format!("WLANProfile/{path}");
        leaves(xml).into_iter().find(|(p, _)| *p == path).map(|(_, t)| t)
    }

    fn cred(ssid: &str, password: &str, security: Security) -> WifiCredential {
        WifiCredential::new(ssid, password, security, false, "").unwrap()
    }

    const KEY: &str = "MSM/security/sharedKey/keyMaterial";
    const AUTH: &str = "MSM/security/authEncryption/authentication";
    const ENC: &str = "MSM/security/authEncryption/encryption";

    #[test]
    fn test_wpa_profile() {
        let xml = encode(&cred("Home", "secret", Security::Wpa)).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(NAMESPACE));
        assert_eq!(text_of(&xml, "name").as_deref(), Some("Home"));
        assert_eq!(text_of(&xml, "SSIDConfig/SSID/hex").as_deref(), Some("486F6D65"));
        assert_eq!(text_of(&xml, "SSIDConfig/SSID/name").as_deref(), Some("Home"));
        assert_eq!(text_of(&xml, "connectionType").as_deref(), Some("ESS"));
        assert_eq!(text_of(&xml, "connectionMode").as_deref(), Some("auto"));
        assert_eq!(text_of(&xml, AUTH).as_deref(), Some("WPA2PSK"));
        assert_eq!(text_of(&xml, ENC).as_deref(), Some("AES"));
        assert_eq!(
            text_of(&xml, "MSM/security/authEncryption/useOneX").as_deref(),
            Some("false")
        );
        assert_eq!(
            text_of(&xml, "MSM/security/sharedKey/keyType").as_deref(),
            Some("passPhrase")
        );
        assert_eq!(
            text_of(&xml, "MSM/security/sharedKey/protected").as_deref(),
            Some("false")
        );
        assert_eq!(text_of(&xml, KEY).as_deref(), Some("secret"));
        assert_eq!(text_of(&xml, "SSIDConfig/nonBroadcast"), None);
    }

    #[test]
    fn test_wep_profile() {
        let xml = encode(&cred("Old", "0123456789", Security::Wep)).unwrap();
        assert_eq!(text_of(&xml, AUTH).as_deref(), Some("open"));
        assert_eq!(text_of(&xml, ENC).as_deref(), Some("WEP"));
        assert_eq!(
            text_of(&xml, "MSM/security/sharedKey/keyType").as_deref(),
            Some("networkKey")
        );
        assert_eq!(text_of(&xml, KEY).as_deref(), Some("0123456789"));
    }

    #[test]
    fn test_open_profile() {
        let xml = encode(&cred("Guest", "", Security::Open)).unwrap();
        assert_eq!(text_of(&xml, AUTH).as_deref(), Some("open"));
        assert_eq!(text_of(&xml, ENC).as_deref(), Some("none"));
        assert!(leaves(&xml).iter().all(|(p, _)| !p.contains("sharedKey")));
    }

    #[test]
    fn unknown_security_encodes_as_wpa2() {
        let xml = encode(&cred("Lab", "pw", Security::Other("SAE".into()))).unwrap();
        assert_eq!(text_of(&xml, AUTH).as_deref(), Some("WPA2PSK"));
        assert_eq!(text_of(&xml, KEY).as_deref(), Some("pw"));
    }

    #[test]
    fn key_material_round_trips_reserved_characters() {
        for pw in [r#"a<b>&c"d'e"#, "p;w:\\,", "in  side", "&amp;", "]]>", "密码 ☕"] {
            for security in [Security::Wpa, Security::Wep] {
                let c = cred("Net", pw, security);
                let xml = encode(&c).unwrap();
                assert_eq!(text_of(&xml, KEY).as_deref(), Some(c.password()), "password {pw:?}");
            }
        }
    }

    #[test]
    fn ssid_is_escaped_but_hex_uses_raw_bytes() {
        let xml = encode(&cred("R&D <5G>", "pw", Security::Wpa)).unwrap();
        assert!(!xml.contains("R&D <5G>"));
        assert_eq!(text_of(&xml, "name").as_deref(), Some("R&D <5G>"));
        assert_eq!(text_of(&xml, "SSIDConfig/SSID/name").as_deref(), Some("R&D <5G>"));
        assert_eq!(
            text_of(&xml, "SSIDConfig/SSID/hex").as_deref(),
            Some(hex::encode_upper("R&D <5G>").as_str())
        );
    }

    #[test]
    fn utf8_ssid_hex() {
        let xml = encode(&cred("café", "pw", Security::Wpa)).unwrap();
        assert_eq!(text_of(&xml, "SSIDConfig/SSID/hex").as_deref(), Some("636166C3A9"));
    }

    #[test]
    fn hidden_network_sets_non_broadcast() {
        let c = parse("WIFI:S:Secret;P:pw;H:true;;").unwrap();
        let xml = encode(&c).unwrap();
        assert_eq!(text_of(&xml, "SSIDConfig/nonBroadcast").as_deref(), Some("true"));
    }

    #[test]
    fn encode_parsed_payload() {
        let c = parse(r"WIFI:T:WPA;S:My\;Net;P:p\:w;;").unwrap();
        let xml = encode(&c).unwrap();
        assert_eq!(text_of(&xml, "name").as_deref(), Some("My;Net"));
        assert_eq!(text_of(&xml, KEY).as_deref(), Some("p:w"));
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = encode(&cred("Net\u{1}", "pw", Security::Wpa)).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidChar { field: "SSID", code: 0x01 }));

        let err = encode(&cred("Net", "p\u{1b}w", Security::Wep)).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidChar { field: "password", code: 0x1B }));

        // 开放网络的密码已被清空，不会触发
        assert!(encode(&cred("Net", "\u{1}", Security::Open)).is_ok());
        assert!(encode(&cred("Net", "tab\there", Security::Wpa)).is_ok());
    }
}
