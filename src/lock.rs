// src/lock.rs - 跨进程文件锁，串行化同一网卡上的 注册 + 连接

use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// 持有期间独占锁文件；drop 时释放
#[derive(Debug)]
pub struct AdapterLock {
    file: File,
    path: PathBuf,
}

impl AdapterLock {
    /// 阻塞直到拿到独占锁
    pub fn acquire(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// 在阻塞线程池里等锁，不占用异步运行时
    pub async fn acquire_async(path: PathBuf) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::acquire(&path))
            .await
            .map_err(io::Error::other)?
    }
}

impl Drop for AdapterLock {
    fn drop(&mut self) {
        // 关闭文件同样会释放锁，这里显式解锁
        if let Err(e) = FileExt::unlock(&self.file) {
            log::debug!("释放锁 {} 失败: {e}", self.path.display());
        }
    }
}
