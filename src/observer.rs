//! # 阶段观察者模块
//!
//! 核心计算不打印任何内容，只把各阶段耗时报告给调用者提供的观察者。

use std::fmt;
use std::time::{Duration, Instant};

/// 隐藏/恢复流程中的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 载体已解码并展平为样本序列。
    Flattened,
    /// 长度标签已读出并校验。
    TagExtracted,
    /// 负载已交织进样本。
    Interleaved,
    /// 负载已从样本中读出。
    Deinterleaved,
    /// 样本已重组回像素网格或 PCM 帧。
    Reassembled,
    /// 载体已编码为容器格式。
    Encoded,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flattened => "Carrier flattened",
            Self::TagExtracted => "Size tag extracted",
            Self::Interleaved => "Payload hidden",
            Self::Deinterleaved => "Payload recovered",
            Self::Reassembled => "Carrier reassembled",
            Self::Encoded => "Carrier encoded",
        };
        // 透传宽度等格式参数
        f.pad(name)
    }
}

/// 接收阶段耗时事件。
pub trait PhaseObserver {
    fn on_phase(&self, phase: Phase, elapsed: Duration);
}

/// 忽略所有事件。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {
    fn on_phase(&self, _phase: Phase, _elapsed: Duration) {}
}

/// 执行 `f` 并把耗时作为 `phase` 报告给 `observer`。
pub fn timed<T>(observer: &dyn PhaseObserver, phase: Phase, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    observer.on_phase(phase, start.elapsed());
    value
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// 记录收到的阶段，供测试断言。
    #[derive(Default)]
    pub struct RecordingObserver {
        pub phases: RefCell<Vec<Phase>>,
    }

    impl PhaseObserver for RecordingObserver {
        fn on_phase(&self, phase: Phase, _elapsed: Duration) {
            self.phases.borrow_mut().push(phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingObserver;
    use super::*;

    #[test]
    fn test_timed_reports_phase_and_returns_value() {
        let observer = RecordingObserver::default();
        let value = timed(&observer, Phase::Interleaved, || 42);
        assert_eq!(value, 42);
        assert_eq!(*observer.phases.borrow(), vec![Phase::Interleaved]);
    }

    #[test]
    fn test_phase_display_honours_width() {
        assert_eq!(format!("{:<20}|", Phase::Encoded), "Carrier encoded     |");
    }
}
