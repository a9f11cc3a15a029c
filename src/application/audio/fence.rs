//! Operation Fence - 过期异步操作的失效计数器
//!
//! 底层异步原语（TTS 请求、解码）不支持取消。每个可取消流程在入口处
//! 捕获 `FenceToken`，在每次状态变更或开始播放之前检查令牌是否仍是当前值；
//! 不一致时静默放弃，不产生任何副作用，也不视为错误。

/// 某一时刻捕获的栅栏值
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FenceToken(u64);

impl FenceToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FenceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 单调递增的操作栅栏
#[derive(Debug, Default)]
pub struct OperationFence {
    value: u64,
}

impl OperationFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> FenceToken {
        FenceToken(self.value)
    }

    /// 使之前捕获的所有令牌失效
    pub fn advance(&mut self) -> FenceToken {
        self.value += 1;
        FenceToken(self.value)
    }

    pub fn is_current(&self, token: FenceToken) -> bool {
        self.value == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_invalidates_previous_tokens() {
        let mut fence = OperationFence::new();
        let first = fence.current();
        assert!(fence.is_current(first));

        let second = fence.advance();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_value_is_monotonic() {
        let mut fence = OperationFence::new();
        let mut last = fence.current();
        for _ in 0..10 {
            let next = fence.advance();
            assert!(next > last);
            last = next;
        }
        assert_eq!(fence.current().value(), 10);
    }
}
