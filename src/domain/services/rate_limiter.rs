// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::utils::errors::CrawlError;
use crate::utils::url_utils::host_of;

/// 每主机状态
struct HostState {
    /// robots.txt覆写的延迟
    delay_override: Option<Duration>,
    /// 下一个可用时隙
    next_at: Instant,
}

/// 每主机限速器
///
/// 预留式设计：每个等待者在锁内取得自己的时隙并把
/// next_at推后一个延迟，随后在锁外睡到自己的时隙。
/// N个并发等待者因此串行化为N个互不重叠的时隙。
/// 等待中被取消时预留不回滚
pub struct HostRateLimiter {
    default_delay: Duration,
    hosts: Mutex<HashMap<String, HostState>>,
}

impl HostRateLimiter {
    /// 创建新的限速器实例
    ///
    /// # 参数
    ///
    /// * `default_delay` - 默认的每主机最小请求间隔
    pub fn new(default_delay: Duration) -> Self {
        Self {
            default_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// 设置主机的延迟覆写
    ///
    /// 实际生效延迟为默认延迟与覆写值中的较大者
    pub fn set_delay(&self, host: &str, delay: Duration) {
        let mut hosts = self.hosts.lock().unwrap();
        match hosts.get_mut(host) {
            Some(state) => state.delay_override = Some(delay),
            None => {
                hosts.insert(
                    host.to_string(),
                    HostState {
                        delay_override: Some(delay),
                        next_at: Instant::now(),
                    },
                );
            }
        }
    }

    /// 主机的实际生效延迟
    pub fn effective_delay(&self, host: &str) -> Duration {
        let hosts = self.hosts.lock().unwrap();
        hosts
            .get(host)
            .and_then(|state| state.delay_override)
            .map(|d| d.max(self.default_delay))
            .unwrap_or(self.default_delay)
    }

    /// 等待URL所属主机的下一个可用时隙
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 已到达预留时隙
    /// * `Err(CrawlError)` - URL无法解析
    pub async fn wait(&self, url_str: &str) -> Result<(), CrawlError> {
        let host = host_of(url_str)?;

        let slot = {
            let mut hosts = self.hosts.lock().unwrap();
            let now = Instant::now();
            let state = hosts.entry(host).or_insert(HostState {
                delay_override: None,
                next_at: now,
            });

            let delay = state
                .delay_override
                .map(|d| d.max(self.default_delay))
                .unwrap_or(self.default_delay);

            let slot = state.next_at.max(now);
            state.next_at = slot + delay;
            slot
        };

        tokio::time::sleep_until(slot).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_get_distinct_slots() {
        let limiter = Arc::new(HostRateLimiter::new(Duration::from_millis(500)));

        let a = {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter.wait("https://h/").await.unwrap();
                Instant::now()
            })
        };
        let b = {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter.wait("https://h/").await.unwrap();
                Instant::now()
            })
        };

        let (t1, t2) = (a.await.unwrap(), b.await.unwrap());
        let gap = if t2 > t1 { t2 - t1 } else { t1 - t2 };
        assert!(
            gap >= Duration::from_millis(500),
            "waiters returned {}ms apart",
            gap.as_millis()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hosts_are_independent() {
        let limiter = HostRateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        limiter.wait("https://a.example/").await.unwrap();
        limiter.wait("https://b.example/").await.unwrap();
        assert!(Instant::now() - start < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_robots_override_raises_delay() {
        let limiter = HostRateLimiter::new(Duration::from_millis(100));
        limiter.set_delay("h", Duration::from_millis(700));
        assert_eq!(limiter.effective_delay("h"), Duration::from_millis(700));

        let start = Instant::now();
        limiter.wait("https://h/").await.unwrap();
        limiter.wait("https://h/").await.unwrap();
        assert!(Instant::now() - start >= Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_override_below_default_is_clamped() {
        let limiter = HostRateLimiter::new(Duration::from_millis(300));
        limiter.set_delay("h", Duration::from_millis(50));
        assert_eq!(limiter.effective_delay("h"), Duration::from_millis(300));
    }
}
