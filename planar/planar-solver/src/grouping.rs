//! Independent-set grouping of contact joints.
//!
//! The SIMD kernels solve `N` contacts per batch by gathering and
//! scattering body velocities through index lanes. Two lanes of one batch
//! must therefore never touch the same body, or the scatters would race.
//! This module produces a permutation of the joint list whose prefix
//! decomposes into groups of exactly `N` body-disjoint joints; the
//! remainder is a tail solved one contact at a time.
//!
//! # Algorithm
//!
//! A greedy multi-pass sweep. Each pass bumps a tag counter and walks the
//! not-yet-grouped joints; a joint whose two bodies both carry an older tag
//! is claimed (both bodies stamped, joint appended to the permutation,
//! swap-removed from the working list) until the pass has `N` joints or the
//! list is exhausted. A pass that cannot fill a whole group terminates the
//! sweep. On typical piles (10^4-10^5 contacts over 10^3-10^5 bodies) a few
//! passes group 80-95% of the joints.
//!
//! Swap-removal replaces the removed slot with the last entry, so survivor
//! order is deterministic given input order, which makes the whole solve
//! reproducible.

use crate::joint::ContactJoint;

/// Builds body-disjoint joint groups, reusing its buffers across calls.
#[derive(Debug, Default)]
pub struct JointGrouper {
    /// Last tag stamped on each body; bumping the tag resets all claims in O(1).
    body_tags: Vec<u32>,
    /// Joint indices not yet assigned to a group.
    work_list: Vec<u32>,
}

impl JointGrouper {
    /// Create a grouper with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permute `joints` into body-disjoint groups of `group_size`.
    ///
    /// Writes the permutation into `order` (which must have one slot per
    /// joint) and returns the group offset: the length of the permutation
    /// prefix that decomposes into full groups, always a multiple of
    /// `group_size`. Entries past the offset form the scalar tail.
    ///
    /// A `group_size` of 1 produces the identity permutation with no tail.
    pub fn group(
        &mut self,
        joints: &[ContactJoint],
        body_count: usize,
        group_size: usize,
        order: &mut [u32],
    ) -> usize {
        debug_assert_eq!(order.len(), joints.len());

        if group_size == 1 {
            for (slot, index) in order.iter_mut().zip(0..) {
                *slot = index;
            }
            return joints.len();
        }

        self.body_tags.clear();
        self.body_tags.resize(body_count, 0);

        self.work_list.clear();
        self.work_list.extend(0..joints.len() as u32);

        let mut tag = 0u32;
        let mut group_offset = 0usize;

        while self.work_list.len() >= group_size {
            tag += 1;

            let mut claimed = 0usize;
            let mut cursor = 0usize;

            while cursor < self.work_list.len() && claimed < group_size {
                let joint_index = self.work_list[cursor];
                let joint = &joints[joint_index as usize];

                let body1 = joint.body1_index as usize;
                let body2 = joint.body2_index as usize;

                if self.body_tags[body1] < tag && self.body_tags[body2] < tag {
                    self.body_tags[body1] = tag;
                    self.body_tags[body2] = tag;

                    order[group_offset + claimed] = joint_index;
                    claimed += 1;

                    self.work_list.swap_remove(cursor);
                } else {
                    cursor += 1;
                }
            }

            group_offset += claimed;

            if claimed < group_size {
                break;
            }
        }

        // Whatever could not be grouped is solved one by one, in working
        // list order.
        for (slot, &joint_index) in order[group_offset..].iter_mut().zip(self.work_list.iter()) {
            *slot = joint_index;
        }

        (group_offset / group_size) * group_size
    }
}
