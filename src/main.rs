// src/main.rs - 主入口 & 子命令
mod config;
mod lock;
mod netsh;
mod parse;
mod profile;
mod qr;
mod report;
mod store;
mod types;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use log::{debug, warn};
use report::ScanReport;
use std::path::PathBuf;
use std::process::ExitCode;
use store::Installer;
use tokio::io::AsyncReadExt;
use types::{Security, WifiCredential};

// ════════════════════════════════════════════════════════════════
// CLI 参数
// ════════════════════════════════════════════════════════════════

#[derive(Parser)]
#[command(name = "wifi-qr", about = "Wi-Fi 二维码载荷解析 & 连接", version)]
struct Cli {
    /// 指定配置文件（默认按顺序查找）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// 解析 WIFI: 载荷并输出凭据
    Parse {
        /// 载荷文本，省略时从 stdin 读取
        payload: Option<String>,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 解析载荷并生成 Windows WLAN profile XML
    Profile {
        payload: Option<String>,
        /// 写入文件而不是 stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 解析载荷，注册 profile 并连接（仅 Windows）
    Connect {
        payload: Option<String>,
        /// netsh 使用的网卡名
        #[arg(long)]
        interface: Option<String>,
    },
    /// 生成 Wi-Fi 二维码，默认使用当前已连接的网络
    Generate {
        #[arg(long)]
        ssid: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// WPA / WEP / nopass
        #[arg(long, default_value = "WPA")]
        security: String,
        #[arg(long)]
        hidden: bool,
        /// 只输出载荷文本
        #[arg(long)]
        payload_only: bool,
    },
}

// ════════════════════════════════════════════════════════════════
// 入口
// ════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    let (mut cfg, load_err) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_level))
        .init();
    if let Some(e) = load_err {
        warn!("配置加载失败，使用默认配置: {e:#}");
    }

    match cli.cmd {
        Cmd::Parse { payload, json } => {
            let raw = read_payload(payload).await?;
            let (report, _) = ScanReport::scan(&raw);
            if json || cfg.json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
            Ok(exit_code(report.success))
        }

        Cmd::Profile { payload, output } => {
            let raw = read_payload(payload).await?;
            let (report, cred) = ScanReport::scan(&raw);
            let Some(cred) = cred else {
                eprintln!("{report}");
                return Ok(ExitCode::FAILURE);
            };
            let xml = profile::encode(&cred)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, xml)
                        .with_context(|| format!("无法写入 {}", path.display()))?;
                    println!("已写入 {}", path.display());
                }
                None => println!("{xml}"),
            }
            Ok(ExitCode::SUCCESS)
        }

        Cmd::Connect { payload, interface } => {
            if interface.is_some() {
                cfg.interface = interface;
            }
            let raw = read_payload(payload).await?;
            let (report, cred) = ScanReport::scan(&raw);
            println!("{report}");
            let Some(cred) = cred else {
                return Ok(ExitCode::FAILURE);
            };

            let installer =
                Installer::new(netsh::NetshStore::new(&cfg)).with_lock_file(cfg.lock_path());
            match installer.install(&cred).await {
                Ok(done) => {
                    debug!("netsh: {}", done.register.message);
                    println!();
                    println!("已连接到 {}", done.ssid);
                    if !done.connect.message.is_empty() {
                        println!("{}", done.connect.message);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("连接失败: {e}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Cmd::Generate {
            ssid,
            password,
            security,
            hidden,
            payload_only,
        } => {
            let cred = build_credential(ssid, password, &security, hidden).await?;
            let data = qr::payload(&cred);
            if payload_only {
                println!("{data}");
            } else {
                println!("{}", qr::render(&data, &cfg)?);
                println!();
                println!("  {data}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// 参数为空时读取 stdin，去掉末尾一个换行
async fn read_payload(arg: Option<String>) -> Result<String> {
    if let Some(p) = arg {
        return Ok(p);
    }
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("读取 stdin 失败")?;
    Ok(strip_newline(buf))
}

fn strip_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

/// 命令行给出 SSID 时直接使用，否则读取当前网络
async fn build_credential(
    ssid: Option<String>,
    password: Option<String>,
    security: &str,
    hidden: bool,
) -> Result<WifiCredential> {
    let security = Security::from(security);
    let (ssid, password) = match ssid {
        Some(s) => (s, password.unwrap_or_default()),
        None => match netsh::current_credentials().await? {
            Some((s, p)) => (s, password.unwrap_or(p)),
            None => bail!("当前没有已连接的 Wi-Fi，请用 --ssid 指定"),
        },
    };
    if security.needs_password() && password.is_empty() {
        warn!("{ssid} 的安全类型为 {security}，但密码为空");
    }
    match WifiCredential::new(ssid, password, security, hidden, "") {
        Some(cred) => Ok(cred),
        None => bail!("SSID 不能为空"),
    }
}
