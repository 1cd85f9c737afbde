//! 执行单元池
//!
//! 按资源类别划分单元，并跟踪每个单元的空闲/忙碌状态。只修改本地状态，不触碰作业。

use super::config::ClassSpec;
use super::id::{JobId, UnitId};
use super::job::ResourceClass;
use crate::sim::SimTime;
use std::collections::BTreeSet;
use thiserror::Error;

/// 一次绑定：哪个作业、从何时开始、本段计划执行多少工作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub job: JobId,
    pub since: SimTime,
    /// 本段计划执行的工作量（round robin 下可能小于剩余工作）
    pub slice: u64,
    /// 本段结束事件在时间线上的序列号
    pub event_seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Idle,
    Running(Binding),
}

/// 执行单元：类别与速度固定不变
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub class: ResourceClass,
    /// 相对最快类别的耗时倍数
    pub speed: u64,
    pub state: UnitState,
}

impl Unit {
    pub fn binding(&self) -> Option<&Binding> {
        match &self.state {
            UnitState::Running(b) => Some(b),
            UnitState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, UnitState::Idle)
    }
}

/// 绑定/释放失败：单元状态与请求不符
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolFault {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("unit {unit} is already running job {job}")]
    AlreadyBound { unit: UnitId, job: JobId },
    #[error("unit {0} is not running any job")]
    NotBound(UnitId),
}

#[derive(Debug, Default)]
pub struct UnitPool {
    units: Vec<Unit>,
    idle_a: BTreeSet<UnitId>,
    idle_b: BTreeSet<UnitId>,
}

impl UnitPool {
    /// A 类单元编号在前，B 类在后
    pub fn new(class_a: ClassSpec, class_b: ClassSpec) -> Self {
        let mut pool = UnitPool::default();
        for (class, spec) in [(ResourceClass::A, class_a), (ResourceClass::B, class_b)] {
            for _ in 0..spec.units {
                let id = UnitId(pool.units.len());
                pool.units.push(Unit {
                    id,
                    class,
                    speed: spec.speed,
                    state: UnitState::Idle,
                });
                pool.idle_set_mut(class).insert(id);
            }
        }
        pool
    }

    fn idle_set(&self, class: ResourceClass) -> &BTreeSet<UnitId> {
        match class {
            ResourceClass::A => &self.idle_a,
            ResourceClass::B => &self.idle_b,
        }
    }

    fn idle_set_mut(&mut self, class: ResourceClass) -> &mut BTreeSet<UnitId> {
        match class {
            ResourceClass::A => &mut self.idle_a,
            ResourceClass::B => &mut self.idle_b,
        }
    }

    /// 取出给定类别中编号最小的空闲单元；调用方需立即 [`UnitPool::bind`]。
    pub fn acquire_idle(&mut self, class: ResourceClass) -> Option<UnitId> {
        self.idle_set_mut(class).pop_first()
    }

    /// 把一个已取出的空闲单元标记为运行中
    pub fn bind(&mut self, id: UnitId, binding: Binding) -> Result<(), PoolFault> {
        let unit = self.units.get_mut(id.0).ok_or(PoolFault::UnknownUnit(id))?;
        if let UnitState::Running(b) = unit.state {
            return Err(PoolFault::AlreadyBound { unit: id, job: b.job });
        }
        let class = unit.class;
        unit.state = UnitState::Running(binding);
        self.idle_set_mut(class).remove(&id);
        Ok(())
    }

    /// 把单元标记为空闲，返回之前的绑定
    pub fn release(&mut self, id: UnitId) -> Result<Binding, PoolFault> {
        let unit = self.units.get_mut(id.0).ok_or(PoolFault::UnknownUnit(id))?;
        let UnitState::Running(binding) = unit.state else {
            return Err(PoolFault::NotBound(id));
        };
        let class = unit.class;
        unit.state = UnitState::Idle;
        self.idle_set_mut(class).insert(id);
        Ok(binding)
    }

    pub fn idle_count(&self, class: ResourceClass) -> usize {
        self.idle_set(class).len()
    }

    pub fn total_idle(&self) -> usize {
        self.idle_a.len() + self.idle_b.len()
    }

    pub fn is_idle(&self, id: UnitId) -> bool {
        self.units.get(id.0).is_some_and(|u| u.is_idle())
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// 正在运行作业的单元（按编号升序）
    pub fn busy(&self) -> impl Iterator<Item = (&Unit, &Binding)> {
        self.units
            .iter()
            .filter_map(|u| u.binding().map(|b| (u, b)))
    }

    pub fn all_idle(&self) -> bool {
        self.total_idle() == self.units.len()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
