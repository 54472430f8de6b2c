// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::workers::worker::Worker;

/// 工作管理器
///
/// 启动固定数量的工作器任务并在收到关闭信号时中止它们。
/// 中止使正在处理的URL不写状态直接终止，遗留的fetching
/// 行由维护调度器回收
#[derive(Default)]
pub struct WorkerManager {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    /// 创建新的工作管理器实例
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// 启动一个工作器
    ///
    /// # 参数
    ///
    /// * `worker` - 要启动的工作器
    pub fn start_worker(&mut self, worker: Arc<dyn Worker>) {
        let handle = tokio::spawn(async move {
            if let Err(e) = worker.run().await {
                error!("Worker {} exited with error: {}", worker.name(), e);
            }
        });
        self.handles.push(handle);
    }

    /// 启动多个同类工作器
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作器数量
    /// * `make` - 工作器构造闭包
    pub fn start_workers<F>(&mut self, count: usize, make: F)
    where
        F: Fn() -> Arc<dyn Worker>,
    {
        for _ in 0..count {
            self.start_worker(make());
        }
    }

    /// 纳管一个已有的后台任务句柄
    pub fn adopt(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    /// 等待关闭信号并关闭工作进程
    ///
    /// 监听关闭信号并中止所有工作器任务
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        info!("Shutting down workers...");
        for handle in &self.handles {
            handle.abort();
        }

        info!("Workers shut down successfully");
    }
}
