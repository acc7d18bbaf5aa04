//! Skeleton topology: joints, offsets and the channel layout they define.
//!
//! Joints live in an arena addressed by [`JointId`]. Parents are stored as ids,
//! children as ordered id lists, and the depth-first listing of the arena fixes
//! where each joint's channels sit inside a motion frame.

use std::fmt;
use std::ops::{Index, Range};

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::euler::Axis;
use crate::BvhError;

/// Channels on a joint that only rotates
pub const ROTATION_CHANNELS: usize = 3;
/// Channels on a joint that translates and rotates
pub const POSITION_ROTATION_CHANNELS: usize = 6;

/// Stable index of a joint inside its [`SkeletonTree`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct JointId(pub u32);

impl JointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a joint block was declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointKind {
    Root,
    Joint,
    EndSite,
}

impl JointKind {
    /// Keyword that opens this joint's block
    #[inline]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::Joint => "JOINT",
            Self::EndSite => "End",
        }
    }
}

/// Order in which a joint's rotation channels are listed and composed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationOrder([Axis; 3]);

impl RotationOrder {
    pub const XYZ: Self = Self([Axis::X, Axis::Y, Axis::Z]);
    pub const XZY: Self = Self([Axis::X, Axis::Z, Axis::Y]);
    pub const YXZ: Self = Self([Axis::Y, Axis::X, Axis::Z]);
    pub const YZX: Self = Self([Axis::Y, Axis::Z, Axis::X]);
    pub const ZXY: Self = Self([Axis::Z, Axis::X, Axis::Y]);
    pub const ZYX: Self = Self([Axis::Z, Axis::Y, Axis::X]);

    /// Build an order from three axes; `None` unless they are all distinct
    pub fn from_axes(axes: [Axis; 3]) -> Option<Self> {
        let [a, b, c] = axes;
        (a != b && b != c && a != c).then_some(Self(axes))
    }

    /// Parse three axis letters such as `"ZXY"`
    pub fn parse(letters: &str) -> Option<Self> {
        let mut axes = [Axis::X; 3];
        let mut chars = letters.chars();
        for slot in axes.iter_mut() {
            *slot = Axis::from_letter(chars.next()?)?;
        }
        if chars.next().is_some() {
            return None;
        }
        Self::from_axes(axes)
    }

    #[inline]
    pub fn axes(&self) -> [Axis; 3] {
        self.0
    }

    /// Axis sequence to decompose a rotation composed in this channel order.
    ///
    /// Only `YXZ` and `ZXY` are decomposed; every other order returns `None`.
    pub fn extraction_order(&self) -> Option<[Axis; 3]> {
        match *self {
            Self::YXZ | Self::ZXY => Some(self.0),
            _ => None,
        }
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            write!(f, "{}", axis.letter())?;
        }
        Ok(())
    }
}

/// Static description of one joint
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    pub kind: JointKind,
    /// Fixed translation relative to the parent joint
    pub offset: Vector3<f64>,
    /// 0 for end sites, 3 or 6 otherwise
    pub channels: usize,
    /// `None` exactly when the joint has no channels
    pub rotation_order: Option<RotationOrder>,
    pub parent: Option<JointId>,
    pub children: Vec<JointId>,
    /// Index of this joint's first channel inside a frame
    pub channel_offset: usize,
    /// Nesting level, 0 for the root
    pub depth: usize,
}

impl JointSpec {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_end_site(&self) -> bool {
        self.kind == JointKind::EndSite
    }

    /// Whether the first three channels are positions rather than the fixed offset
    #[inline]
    pub fn has_position_channels(&self) -> bool {
        self.channels == POSITION_ROTATION_CHANNELS
    }

    #[inline]
    pub fn channel_range(&self) -> Range<usize> {
        self.channel_offset..self.channel_offset + self.channels
    }
}

/// Immutable joint hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonTree {
    joints: Vec<JointSpec>,
    depth_first: Vec<JointId>,
    by_name: HashMap<String, JointId>,
    total_channels: usize,
}

impl SkeletonTree {
    #[inline]
    pub fn root(&self) -> JointId {
        self.depth_first[0]
    }

    #[inline]
    pub fn get(&self, id: JointId) -> Option<&JointSpec> {
        self.joints.get(id.index())
    }

    /// All joints in depth-first order
    pub fn joints(&self) -> impl Iterator<Item = (JointId, &JointSpec)> + '_ {
        self.depth_first.iter().map(|id| (*id, &self.joints[id.index()]))
    }

    #[inline]
    pub fn depth_first(&self) -> &[JointId] {
        &self.depth_first
    }

    /// Look up a named joint; end sites are not indexed by name
    #[inline]
    pub fn find(&self, name: &str) -> Option<JointId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn joint_by_name(&self, name: &str) -> Option<&JointSpec> {
        self.find(name).map(|id| &self[id])
    }

    #[inline]
    pub fn parent(&self, id: JointId) -> Option<JointId> {
        self.get(id).and_then(|joint| joint.parent)
    }

    #[inline]
    pub fn children(&self, id: JointId) -> &[JointId] {
        self.get(id)
            .map(|joint| joint.children.as_slice())
            .unwrap_or(&[])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Length every motion frame must have
    #[inline]
    pub fn total_channels(&self) -> usize {
        self.total_channels
    }
}

impl Index<JointId> for SkeletonTree {
    type Output = JointSpec;

    fn index(&self, id: JointId) -> &JointSpec {
        &self.joints[id.index()]
    }
}

/// Incrementally assembles a [`SkeletonTree`], validating it on [`build`](Self::build)
#[derive(Debug, Default)]
pub struct SkeletonBuilder {
    joints: Vec<JointSpec>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint under `parent`, returning its id
    pub fn add_joint(
        &mut self,
        kind: JointKind,
        name: impl Into<String>,
        parent: Option<JointId>,
    ) -> JointId {
        let id = JointId(self.joints.len() as u32);
        let depth = match parent.and_then(|p| self.joints.get_mut(p.index())) {
            Some(parent_joint) => {
                parent_joint.children.push(id);
                parent_joint.depth + 1
            }
            None => 0,
        };
        self.joints.push(JointSpec {
            name: name.into(),
            kind,
            offset: Vector3::zeros(),
            channels: 0,
            rotation_order: None,
            parent,
            children: Vec::new(),
            channel_offset: 0,
            depth,
        });
        id
    }

    pub fn set_offset(&mut self, id: JointId, offset: Vector3<f64>) {
        if let Some(joint) = self.joints.get_mut(id.index()) {
            joint.offset = offset;
        }
    }

    /// Declare a joint's channel count and rotation order
    pub fn set_channels(
        &mut self,
        id: JointId,
        count: usize,
        order: RotationOrder,
    ) -> Result<(), BvhError> {
        let joint = self
            .joints
            .get_mut(id.index())
            .ok_or_else(|| BvhError::InvalidValue {
                reason: format!("Joint {} does not exist", id.0),
            })?;
        if joint.is_end_site()
            || (count != ROTATION_CHANNELS && count != POSITION_ROTATION_CHANNELS)
        {
            return Err(BvhError::InvalidChannels {
                joint: joint.name.clone(),
                count,
            });
        }
        joint.channels = count;
        joint.rotation_order = Some(order);
        Ok(())
    }

    #[inline]
    pub fn parent(&self, id: JointId) -> Option<JointId> {
        self.joints.get(id.index()).and_then(|joint| joint.parent)
    }

    #[inline]
    pub fn name(&self, id: JointId) -> Option<&str> {
        self.joints.get(id.index()).map(|joint| joint.name.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Validate channel invariants and lay out channels depth-first
    pub fn build(mut self) -> Result<SkeletonTree, BvhError> {
        let root = match self.joints.first() {
            Some(joint) if joint.kind == JointKind::Root => JointId(0),
            Some(joint) => {
                return Err(BvhError::UnexpectedToken {
                    token: joint.kind.keyword().to_string(),
                    line: 0,
                })
            }
            None => {
                return Err(BvhError::UnexpectedEof {
                    expected: "ROOT joint".to_string(),
                })
            }
        };

        for joint in &self.joints {
            let valid = match joint.kind {
                JointKind::EndSite => joint.channels == 0,
                JointKind::Root | JointKind::Joint => joint.rotation_order.is_some(),
            };
            if !valid {
                return Err(BvhError::InvalidChannels {
                    joint: joint.name.clone(),
                    count: joint.channels,
                });
            }
        }

        let mut depth_first = Vec::with_capacity(self.joints.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            depth_first.push(id);
            stack.extend(self.joints[id.index()].children.iter().rev().copied());
        }

        let mut total_channels = 0;
        for id in &depth_first {
            let joint = &mut self.joints[id.index()];
            joint.channel_offset = total_channels;
            total_channels += joint.channels;
        }

        let by_name = depth_first
            .iter()
            .map(|id| (id, &self.joints[id.index()]))
            .filter(|(_, joint)| !joint.is_end_site())
            .map(|(id, joint)| (joint.name.clone(), *id))
            .collect();

        Ok(SkeletonTree {
            joints: self.joints,
            depth_first,
            by_name,
            total_channels,
        })
    }
}
