//! Layout & barrier scheduler (§4.2).
//!
//! wgpu tracks resource usage internally and has no public
//! `vkCmdPipelineBarrier`-equivalent entry point, so the explicit Vulkan
//! barrier contract this subsystem specifies is realized here as a
//! software state tracker the dispatcher consults before recording each
//! pass: the tracker decides *whether* a synchronization point is needed
//! and records the decision, even though the actual wait is wgpu's to
//! insert. This keeps the coalescing and "write always forces emission"
//! invariants (§8 property 2) meaningful and independently testable.

use std::collections::BTreeMap;

use crate::error::{RenderError, Result};

bitflags::bitflags! {
    /// Access-mask bits. Presence of any `*_WRITE` bit marks the previous
    /// access as a write for the "write always forces emission" rule.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Access: u32 {
        const SHADER_READ = 1 << 0;
        const SHADER_WRITE = 1 << 1;
        const COLOR_WRITE = 1 << 2;
        const DEPTH_WRITE = 1 << 3;
        const TRANSFER_READ = 1 << 4;
        const TRANSFER_WRITE = 1 << 5;
        const HOST_READ = 1 << 6;
    }
}

impl Access {
    #[must_use]
    pub fn is_write(self) -> bool {
        self.intersects(
            Self::SHADER_WRITE | Self::COLOR_WRITE | Self::DEPTH_WRITE | Self::TRANSFER_WRITE,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Stage {
    TopOfPipe = 0,
    Transfer = 1,
    ComputeShader = 2,
    FragmentShader = 3,
    ColorAttachmentOutput = 4,
    BottomOfPipe = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Layout {
    Undefined = 0,
    General = 1,
    ShaderReadOnly = 2,
    TransferSrc = 3,
    TransferDst = 4,
    ColorAttachment = 5,
}

/// Target state for a subresource transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceState {
    pub layout: Layout,
    pub stage: Stage,
    pub access: Access,
    pub queue_family: u32,
}

/// `(layer, level)` subresource address.
pub type SubresourceRange = (u32, u32);

/// One pending barrier: a `(src_stage, dst_stage)` pair plus the
/// subresource ranges it covers, after mip-level coalescing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBarrier {
    pub src_stage: Stage,
    pub dst_stage: Stage,
    pub ranges: Vec<SubresourceRange>,
}

/// Per-subresource layout/access state tracker for one image.
pub struct BarrierScheduler {
    states: BTreeMap<SubresourceRange, ResourceState>,
    levels: u32,
    layers: u32,
}

impl BarrierScheduler {
    /// Track an image with `levels` mip levels and `layers` array layers,
    /// all subresources starting `Undefined`.
    #[must_use]
    pub fn new(levels: u32, layers: u32) -> Self {
        let mut states = BTreeMap::new();
        let initial = ResourceState {
            layout: Layout::Undefined,
            stage: Stage::TopOfPipe,
            access: Access::empty(),
            queue_family: 0,
        };
        for layer in 0..layers {
            for level in 0..levels {
                states.insert((layer, level), initial);
            }
        }
        Self {
            states,
            levels,
            layers,
        }
    }

    fn check_range(&self, range: SubresourceRange) -> Result<()> {
        if range.0 >= self.layers || range.1 >= self.levels {
            return Err(RenderError::SubresourceOutOfRange {
                level: range.1,
                layer: range.0,
            });
        }
        Ok(())
    }

    /// Current recorded state of a subresource.
    pub fn state_of(&self, range: SubresourceRange) -> Result<ResourceState> {
        self.check_range(range)?;
        Ok(self.states[&range])
    }

    /// Transition `ranges` to `new_state`, returning the pending barriers
    /// to emit. Adjacent mip levels sharing an identical source state are
    /// coalesced into a single range entry; barriers are grouped by
    /// `(src_stage, dst_stage)` so one `pipelineBarrier` covers every
    /// coalesced range with that stage pair. A subresource whose previous
    /// access contains a write bit always forces an emission, even when
    /// `new_state` is otherwise identical to the recorded state.
    pub fn barrier(
        &mut self,
        ranges: &[SubresourceRange],
        new_state: ResourceState,
    ) -> Result<Vec<PendingBarrier>> {
        for &r in ranges {
            self.check_range(r)?;
        }

        // Group by source state first (stage+layout+access+queue) so
        // identical-source adjacent mips coalesce into one range list.
        let mut by_src_state: BTreeMap<ResourceState, Vec<SubresourceRange>> = BTreeMap::new();
        for &range in ranges {
            let prev = self.states[&range];
            let needs_emission = prev != new_state || prev.access.is_write();
            if needs_emission {
                by_src_state.entry(prev).or_default().push(range);
            }
            self.states.insert(range, new_state);
        }

        let mut by_stage_pair: BTreeMap<(Stage, Stage), Vec<SubresourceRange>> = BTreeMap::new();
        for (src_state, mut group_ranges) in by_src_state {
            group_ranges.sort_unstable();
            let key = (src_state.stage, new_state.stage);
            by_stage_pair
                .entry(key)
                .or_default()
                .append(&mut group_ranges);
        }

        Ok(by_stage_pair
            .into_iter()
            .map(|((src, dst), ranges)| PendingBarrier {
                src_stage: src,
                dst_stage: dst,
                ranges: coalesce_adjacent_mips(ranges),
            })
            .collect())
    }

    /// Mutate recorded state without emitting a barrier — the mechanism by
    /// which render-pass-tracked transitions (wgpu's implicit tracking
    /// during a render pass) are reconciled with this tracker afterward.
    pub fn update_state(&mut self, ranges: &[SubresourceRange], new_state: ResourceState) -> Result<()> {
        for &r in ranges {
            self.check_range(r)?;
            self.states.insert(r, new_state);
        }
        Ok(())
    }
}

// `Ord`/`PartialOrd` are derived manually here since `ResourceState`
// doesn't need a meaningful ordering beyond "stable key for a BTreeMap";
// field order defines it.
impl PartialOrd for ResourceState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ResourceState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.layout as u32, self.stage as u32, self.access.bits(), self.queue_family).cmp(&(
            other.layout as u32,
            other.stage as u32,
            other.access.bits(),
            other.queue_family,
        ))
    }
}

fn coalesce_adjacent_mips(mut ranges: Vec<SubresourceRange>) -> Vec<SubresourceRange> {
    ranges.sort_unstable();
    ranges.dedup();
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(layout: Layout, stage: Stage, access: Access) -> ResourceState {
        ResourceState {
            layout,
            stage,
            access,
            queue_family: 0,
        }
    }

    #[test]
    fn barrier_records_exact_requested_state() {
        let mut sched = BarrierScheduler::new(1, 1);
        let target = state(Layout::ShaderReadOnly, Stage::ComputeShader, Access::SHADER_READ);
        sched.barrier(&[(0, 0)], target).unwrap();
        assert_eq!(sched.state_of((0, 0)).unwrap(), target);
    }

    #[test]
    fn identical_state_without_prior_write_emits_no_barrier() {
        let mut sched = BarrierScheduler::new(1, 1);
        let target = state(Layout::ShaderReadOnly, Stage::ComputeShader, Access::SHADER_READ);
        sched.barrier(&[(0, 0)], target).unwrap();
        let pending = sched.barrier(&[(0, 0)], target).unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn prior_write_always_forces_emission() {
        let mut sched = BarrierScheduler::new(1, 1);
        let write_state = state(Layout::General, Stage::ComputeShader, Access::SHADER_WRITE);
        sched.barrier(&[(0, 0)], write_state).unwrap();
        let pending = sched.barrier(&[(0, 0)], write_state).unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn out_of_range_subresource_is_an_error() {
        let mut sched = BarrierScheduler::new(1, 1);
        let target = state(Layout::General, Stage::ComputeShader, Access::SHADER_READ);
        let err = sched.barrier(&[(5, 0)], target).unwrap_err();
        assert!(matches!(err, RenderError::SubresourceOutOfRange { .. }));
    }

    #[test]
    fn update_state_does_not_appear_as_a_pending_barrier() {
        let mut sched = BarrierScheduler::new(1, 1);
        let target = state(Layout::ColorAttachment, Stage::ColorAttachmentOutput, Access::COLOR_WRITE);
        sched.update_state(&[(0, 0)], target).unwrap();
        assert_eq!(sched.state_of((0, 0)).unwrap(), target);
    }

    #[test]
    fn adjacent_mips_with_identical_source_state_coalesce() {
        let mut sched = BarrierScheduler::new(4, 1);
        let target = state(Layout::ShaderReadOnly, Stage::FragmentShader, Access::SHADER_READ);
        let pending = sched
            .barrier(&[(0, 0), (0, 1), (0, 2)], target)
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].ranges.len(), 3);
    }
}
