// src/qr.rs - 生成 WIFI: 载荷，用 qrcode crate 渲染为 UTF-8 块字符二维码

use crate::config::Config;
use crate::types::WifiCredential;
use anyhow::Result;
use qrcode::render::unicode;
use qrcode::QrCode;

/// 生成 Wi-Fi 二维码载荷文本
pub fn payload(cred: &WifiCredential) -> String {
    let ssid_esc = escape_wifi_field(cred.ssid());
    let pass_esc = escape_wifi_field(cred.password());
    let sec_str = escape_wifi_field(cred.security().token());

    let mut data = format!("WIFI:T:{sec_str};S:{ssid_esc};P:{pass_esc};");
    if cred.hidden() {
        data.push_str("H:true;");
    }
    data.push(';');
    data
}

/// 把载荷渲染成终端可显示的二维码
pub fn render(data: &str, cfg: &Config) -> Result<String> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), cfg.ec_level())?;
    let image = code
        .render::<unicode::Dense1x2>()
        .quiet_zone(cfg.qr_quiet_zone)
        .build();

    // 每行加两个前导空格
    let padded = image
        .lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(padded)
}

/// 转义 Wi-Fi QR 格式中的保留字符
fn escape_wifi_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' | ';' | ',' | '"' | ':' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::types::Security;

    #[test]
    fn test_payload_format() {
        let cred = WifiCredential::new("Home", "secret", Security::Wpa, false, "").unwrap();
        assert_eq!(payload(&cred), "WIFI:T:WPA;S:Home;P:secret;;");

        let cred = WifiCredential::new("Guest", "", Security::Open, true, "").unwrap();
        assert_eq!(payload(&cred), "WIFI:T:nopass;S:Guest;P:;H:true;;");
    }

    #[test]
    fn payload_escapes_reserved_characters() {
        let cred =
            WifiCredential::new(r#"a;b:c,d\e"f"#, "p;w", Security::Wep, false, "").unwrap();
        assert_eq!(
            payload(&cred),
            r#"WIFI:T:WEP;S:a\;b\:c\,d\\e\"f;P:p\;w;;"#
        );
    }

    #[test]
    fn payload_parses_back() {
        for (ssid, pw, sec, hidden) in [
            ("Home", "secret", Security::Wpa, false),
            (r"My\;Net", r#"x:"y",z"#, Security::Wep, true),
            ("Café", "", Security::Open, false),
            ("Lab", "pw", Security::Other("SAE".into()), false),
        ] {
            let cred = WifiCredential::new(ssid, pw, sec, hidden, "").unwrap();
            let data = payload(&cred);
            let back = parse(&data).unwrap();
            assert_eq!(back.ssid(), cred.ssid());
            assert_eq!(back.password(), cred.password());
            assert_eq!(back.security(), cred.security());
            assert_eq!(back.hidden(), cred.hidden());
        }
    }

    #[test]
    fn render_produces_square_block() {
        let out = render("WIFI:T:WPA;S:Home;P:secret;;", &Config::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.len() > 10);
        assert!(lines.iter().all(|l| l.starts_with("  ")));
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }
}
