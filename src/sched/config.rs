//! 调度配置
//!
//! 五种调度方式都是同一个引擎的不同配置：队列排序、抢占触发、到达模式、是否分区、是否迁移。

use super::error::ConfigError;
use super::job::ClassLimits;
use serde::{Deserialize, Serialize};

/// 某一资源类别的单元数与速度倍数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub units: usize,
    /// 完成同样工作所需时间相对最快类别的倍数（B 类为 1）
    pub speed: u64,
}

impl ClassSpec {
    pub const fn new(units: usize, speed: u64) -> Self {
        Self { units, speed }
    }
}

/// 等待队列的排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    /// 入队顺序
    Fifo,
    /// 剩余工作最少者优先，相同时 id 小者优先
    ShortestRemaining,
}

/// 抢占触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PreemptionMode {
    Disabled,
    /// 到达的作业无法立即放置时，评估是否挤掉正在运行的作业
    OnArrival,
    /// Round robin：每段最多执行 `quantum` 个工作单位
    Quantum { quantum: u64 },
}

/// 作业进入系统的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalMode {
    /// 所有作业在 t=0 时已在队列中
    Static,
    /// 作业通过 Arrival 事件在各自的到达时间进入
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedConfig {
    pub class_a: ClassSpec,
    pub class_b: ClassSpec,
    /// 是否按资源类别分区（关闭时所有作业共用一条队列，不检查兼容性）
    pub partitioned: bool,
    pub order: QueueOrder,
    pub preemption: PreemptionMode,
    pub arrivals: ArrivalMode,
    pub migration: bool,
    pub limits: ClassLimits,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            class_a: ClassSpec::new(3, 2),
            class_b: ClassSpec::new(3, 1),
            partitioned: true,
            order: QueueOrder::ShortestRemaining,
            preemption: PreemptionMode::OnArrival,
            arrivals: ArrivalMode::Dynamic,
            migration: true,
            limits: ClassLimits::default(),
        }
    }
}

impl SchedConfig {
    /// 单一类别：`units` 个速度为 1 的单元
    fn single_class(units: usize, order: QueueOrder, preemption: PreemptionMode) -> Self {
        Self {
            class_a: ClassSpec::new(0, 2),
            class_b: ClassSpec::new(units, 1),
            partitioned: false,
            order,
            preemption,
            arrivals: ArrivalMode::Static,
            migration: false,
            limits: ClassLimits::default(),
        }
    }

    pub fn fifo(units: usize) -> Self {
        Self::single_class(units, QueueOrder::Fifo, PreemptionMode::Disabled)
    }

    pub fn round_robin(units: usize, quantum: u64) -> Self {
        Self::single_class(units, QueueOrder::Fifo, PreemptionMode::Quantum { quantum })
    }

    pub fn sjf(units: usize) -> Self {
        Self::single_class(units, QueueOrder::ShortestRemaining, PreemptionMode::Disabled)
    }

    /// 快慢两类单元，但不区分内存需求（所有作业都可在任意单元运行）
    pub fn sjf_heterogeneous(slow: usize, fast: usize) -> Self {
        Self {
            class_a: ClassSpec::new(slow, 2),
            class_b: ClassSpec::new(fast, 1),
            partitioned: false,
            order: QueueOrder::ShortestRemaining,
            preemption: PreemptionMode::Disabled,
            arrivals: ArrivalMode::Static,
            migration: true,
            limits: ClassLimits::default(),
        }
    }

    /// 按内存需求分区，所有作业在 t=0 到达
    pub fn sjf_partitioned(slow: usize, fast: usize) -> Self {
        Self {
            partitioned: true,
            ..Self::sjf_heterogeneous(slow, fast)
        }
    }

    /// 按内存需求分区，动态到达并在到达时抢占
    pub fn sjf_dynamic(slow: usize, fast: usize) -> Self {
        Self {
            preemption: PreemptionMode::OnArrival,
            arrivals: ArrivalMode::Dynamic,
            ..Self::sjf_partitioned(slow, fast)
        }
    }

    /// 用 JSON 对象中出现的顶层字段覆盖当前配置，未出现的字段保持不变。
    ///
    /// 每个顶层字段整体替换（例如 `class_a` 需要同时给出 `units` 与 `speed`）。
    pub fn overlay(&self, patch: &serde_json::Value) -> Result<SchedConfig, serde_json::Error> {
        let Some(fields) = patch.as_object() else {
            // 非对象交给反序列化报错
            return serde_json::from_value(patch.clone());
        };
        let mut merged = serde_json::to_value(self)?;
        if let Some(base) = merged.as_object_mut() {
            for (key, value) in fields {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged)
    }

    pub fn total_units(&self) -> usize {
        self.class_a.units + self.class_b.units
    }

    pub fn quantum(&self) -> Option<u64> {
        match self.preemption {
            PreemptionMode::Quantum { quantum } => Some(quantum),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_units() == 0 {
            return Err(ConfigError::NoUnits);
        }
        for (name, spec) in [("a", self.class_a), ("b", self.class_b)] {
            if spec.speed == 0 {
                return Err(ConfigError::ZeroSpeed { class: name });
            }
        }
        if self.quantum() == Some(0) {
            return Err(ConfigError::ZeroQuantum);
        }
        if self.limits.class_a_max > self.limits.class_b_max {
            return Err(ConfigError::InvertedLimits {
                class_a_max: self.limits.class_a_max,
                class_b_max: self.limits.class_b_max,
            });
        }
        Ok(())
    }
}
