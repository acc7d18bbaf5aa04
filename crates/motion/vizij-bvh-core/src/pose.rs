//! Per-joint runtime state: raw channels, local and global transforms.
//!
//! Forward pass: [`Pose::load_raw`] slices a frame into each joint's raw
//! channels, [`Pose::update_matrices`] turns those into transforms.
//! Inverse pass: [`Pose::extract_raw`] decomposes local transforms back into
//! raw channels, [`Pose::store_raw`] joins them into a frame.
//!
//! Transforms use column vectors. A joint with rotation channels `a1 a2 a3`
//! gets `local = T * R(a1) * R(a2) * R(a3)` where `T` is its position channels
//! (6-channel joints) or its fixed offset, and `global = parent.global * local`.

use std::ops::Index;

use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};
use tracing::warn;

use crate::euler::euler_from_matrix;
use crate::skeleton::{JointId, RotationOrder, SkeletonTree};
use crate::BvhError;

/// Transforms and raw channels of one joint for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct JointPose {
    raw: Vec<f64>,
    /// Relative to the parent joint
    pub local: Matrix4<f64>,
    /// Relative to the world
    pub global: Matrix4<f64>,
}

impl JointPose {
    fn new(channels: usize) -> Self {
        Self {
            raw: vec![0.0; channels],
            local: Matrix4::identity(),
            global: Matrix4::identity(),
        }
    }

    /// This joint's slice of the frame, in declared channel order
    #[inline]
    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    /// Edit raw channels in place; the channel count is fixed by the skeleton
    #[inline]
    pub fn raw_mut(&mut self) -> &mut [f64] {
        &mut self.raw
    }

    /// World-space position
    #[inline]
    pub fn position(&self) -> Vector3<f64> {
        translation(&self.global)
    }

    /// Position relative to the parent
    #[inline]
    pub fn position_local(&self) -> Vector3<f64> {
        translation(&self.local)
    }

    /// World-space orientation
    #[inline]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        orientation(&self.global)
    }

    /// Orientation relative to the parent
    #[inline]
    pub fn rotation_local(&self) -> UnitQuaternion<f64> {
        orientation(&self.local)
    }
}

fn translation(m: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

fn rotation_part(m: &Matrix4<f64>) -> Matrix3<f64> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

fn orientation(m: &Matrix4<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_part(m)))
}

/// A joint whose raw rotation channels were left untouched by [`Pose::extract_raw`]
#[derive(Debug, Clone, PartialEq)]
pub struct StaleJoint {
    pub joint: JointId,
    pub name: String,
    pub order: RotationOrder,
}

/// Outcome of an inverse pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    pub stale: Vec<StaleJoint>,
}

impl ExtractionReport {
    /// True when every joint's raw channels were rewritten
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.stale.is_empty()
    }

    /// Turn the first stale joint into an error
    pub fn into_result(self) -> Result<(), BvhError> {
        match self.stale.into_iter().next() {
            Some(stale) => Err(BvhError::UnsupportedRotationOrder {
                joint: stale.name,
                order: stale.order.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Runtime state for every joint of a skeleton, indexed by [`JointId`]
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    joints: Vec<JointPose>,
}

impl Pose {
    /// Zeroed channels and identity transforms
    pub fn new(skeleton: &SkeletonTree) -> Self {
        let mut joints = vec![JointPose::new(0); skeleton.len()];
        for (id, joint) in skeleton.joints() {
            joints[id.index()] = JointPose::new(joint.channels);
        }
        Self { joints }
    }

    /// Split `frame` into each joint's raw channels
    pub fn load_raw(&mut self, skeleton: &SkeletonTree, frame: &[f64]) -> Result<(), BvhError> {
        check_frame(skeleton, frame.len())?;
        for (id, joint) in skeleton.joints() {
            let pose = &mut self.joints[id.index()];
            pose.raw.clear();
            pose.raw.extend_from_slice(&frame[joint.channel_range()]);
        }
        Ok(())
    }

    /// Recompute local and global transforms from raw channels
    pub fn update_matrices(&mut self, skeleton: &SkeletonTree) {
        // Depth-first order visits every parent before its children.
        for (id, joint) in skeleton.joints() {
            let raw = &self.joints[id.index()].raw;
            let base = if joint.has_position_channels() {
                Vector3::new(raw[0], raw[1], raw[2])
            } else {
                joint.offset
            };
            let mut local = Matrix4::new_translation(&base);
            if let Some(order) = joint.rotation_order {
                let angles = &raw[joint.channels - 3..];
                for (axis, degrees) in order.axes().into_iter().zip(angles) {
                    local *= Rotation3::from_axis_angle(&axis.unit(), degrees.to_radians())
                        .to_homogeneous();
                }
            }

            let global = match joint.parent {
                Some(parent) => self.joints[parent.index()].global * local,
                None => local,
            };
            let pose = &mut self.joints[id.index()];
            pose.local = local;
            pose.global = global;
        }
    }

    /// Forward kinematics for one frame
    pub fn evaluate(&mut self, skeleton: &SkeletonTree, frame: &[f64]) -> Result<(), BvhError> {
        self.load_raw(skeleton, frame)?;
        self.update_matrices(skeleton);
        Ok(())
    }

    /// Recover raw channels from local transforms.
    ///
    /// Joints whose rotation order has no decomposition keep their previous raw
    /// values and are listed in the report; the rest of the tree is still processed.
    pub fn extract_raw(&mut self, skeleton: &SkeletonTree) -> ExtractionReport {
        let mut report = ExtractionReport::default();
        for (id, joint) in skeleton.joints() {
            let Some(order) = joint.rotation_order else {
                continue;
            };
            let pose = &mut self.joints[id.index()];

            if joint.has_position_channels() {
                let t = translation(&pose.local);
                pose.raw[..3].copy_from_slice(t.as_slice());
            }

            let Some(sequence) = order.extraction_order() else {
                warn!(joint = %joint.name, order = %order, "rotation order cannot be extracted; channels left stale");
                report.stale.push(StaleJoint {
                    joint: id,
                    name: joint.name.clone(),
                    order,
                });
                continue;
            };

            let angles = euler_from_matrix(&rotation_part(&pose.local), sequence);
            let rotation = &mut pose.raw[joint.channels - 3..];
            for (value, angle) in rotation.iter_mut().zip(angles) {
                *value = angle.to_degrees();
            }
        }
        report
    }

    /// Join each joint's raw channels into `frame`
    pub fn store_raw(&self, skeleton: &SkeletonTree, frame: &mut [f64]) -> Result<(), BvhError> {
        check_frame(skeleton, frame.len())?;
        for (id, joint) in skeleton.joints() {
            frame[joint.channel_range()].copy_from_slice(&self.joints[id.index()].raw);
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: JointId) -> Option<&JointPose> {
        self.joints.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: JointId) -> Option<&mut JointPose> {
        self.joints.get_mut(id.index())
    }

    /// Replace a joint's local transform ahead of [`extract_raw`](Self::extract_raw)
    pub fn set_local(&mut self, id: JointId, local: Matrix4<f64>) -> bool {
        match self.joints.get_mut(id.index()) {
            Some(pose) => {
                pose.local = local;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

impl Index<JointId> for Pose {
    type Output = JointPose;

    fn index(&self, id: JointId) -> &JointPose {
        &self.joints[id.index()]
    }
}

fn check_frame(skeleton: &SkeletonTree, found: usize) -> Result<(), BvhError> {
    if found != skeleton.total_channels() {
        return Err(BvhError::FrameLength {
            expected: skeleton.total_channels(),
            found,
        });
    }
    Ok(())
}
