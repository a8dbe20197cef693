// src/store.rs - 系统网络 profile 操作的抽象，以及 注册 + 连接 的串行执行

use crate::lock::AdapterLock;
use crate::profile::{self, ProfileError};
use crate::types::WifiCredential;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("当前系统不支持自动连接（仅支持 Windows）")]
    Unsupported,
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("无法生成 profile: {0}")]
    Profile(#[from] ProfileError),
    /// 命令退出码非零，stderr 原样保留
    #[error("{command} 执行失败 (exit {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// 命令成功时的输出文本，调用方只负责展示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub message: String,
}

/// 系统网络 profile 存储（netsh / 测试替身）
#[async_trait]
pub trait NetworkProfileStore: Send + Sync {
    /// 注册一份 profile 文档
    async fn register(&self, profile_xml: &str) -> Result<CommandOutput, StoreError>;
    /// 按名称连接已注册的网络
    async fn connect(&self, ssid: &str) -> Result<CommandOutput, StoreError>;
}

/// 安装结果
#[derive(Debug)]
pub struct Installed {
    pub ssid: String,
    pub register: CommandOutput,
    pub connect: CommandOutput,
}

/// 把凭据写入系统并连接。同一个 Installer 上的调用互斥执行；
/// 设置了锁文件时，共用同一锁文件的其他进程也会与之互斥
pub struct Installer<S> {
    store: S,
    lock: Mutex<()>,
    lock_file: Option<PathBuf>,
}

impl<S: NetworkProfileStore> Installer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            lock_file: None,
        }
    }

    /// 用锁文件做跨进程互斥（按网卡区分）
    pub fn with_lock_file(mut self, path: PathBuf) -> Self {
        self.lock_file = Some(path);
        self
    }

    /// 注册失败则不再尝试连接；任何失败都不自动重试
    pub async fn install(&self, cred: &WifiCredential) -> Result<Installed, StoreError> {
        let _guard = self.lock.lock().await;
        let _adapter = match &self.lock_file {
            Some(path) => {
                debug!("等待网卡锁 {}", path.display());
                Some(AdapterLock::acquire_async(path.clone()).await?)
            }
            None => None,
        };

        let xml = profile::encode(cred)?;
        debug!("注册 profile: {} ({} 字节)", cred.ssid(), xml.len());
        let register = self.store.register(&xml).await.map_err(|e| {
            warn!("注册 profile 失败: {e}");
            e
        })?;

        let connect = self.store.connect(cred.ssid()).await.map_err(|e| {
            warn!("连接 {} 失败: {e}", cred.ssid());
            e
        })?;
        info!("已连接 {}", cred.ssid());

        Ok(Installed {
            ssid: cred.ssid().to_string(),
            register,
            connect,
        })
    }
}
