//! The clip object: a loaded skeleton and motion driven by a transport.

use std::io::{Read, Write};
use std::path::Path;

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BvhConfig;
use crate::motion::MotionBuffer;
use crate::parser::parse_bvh;
use crate::pose::{ExtractionReport, JointPose, Pose};
use crate::skeleton::{JointId, JointSpec, SkeletonTree};
use crate::transport::{Clock, PlaybackState, SystemClock, Transport};
use crate::writer::write_bvh;
use crate::{BvhError, Result};

/// Everything that exists only after a successful load
#[derive(Debug, Clone)]
struct Loaded {
    skeleton: SkeletonTree,
    motion: MotionBuffer,
    pose: Pose,
}

#[derive(Debug, Clone)]
enum ClipState {
    Unloaded,
    Loaded(Loaded),
}

/// A motion clip: skeleton, frames, per-joint pose and playback transport.
///
/// Operations that need frames return [`BvhError::NotReady`] until a load
/// succeeds with at least one frame. A failed load leaves the clip unloaded.
#[derive(Debug, Clone)]
pub struct Bvh<C: Clock = SystemClock> {
    clock: C,
    config: BvhConfig,
    transport: Transport,
    state: ClipState,
}

impl Bvh<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(BvhConfig::default())
    }

    pub fn with_config(config: BvhConfig) -> Self {
        Self::with_clock(SystemClock::new(), config)
    }

    /// Parse `text` into a new clip
    pub fn parse(text: &str) -> Result<Self> {
        let mut clip = Self::new();
        clip.load_str(text)?;
        Ok(clip)
    }

    /// Load a file into a new clip
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut clip = Self::new();
        clip.load_file(path)?;
        Ok(clip)
    }
}

impl Default for Bvh<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one joint and its current pose
#[derive(Debug, Clone, Copy)]
pub struct JointRef<'a> {
    pub id: JointId,
    pub spec: &'a JointSpec,
    pub pose: &'a JointPose,
}

impl<'a> JointRef<'a> {
    #[inline]
    pub fn name(&self) -> &'a str {
        &self.spec.name
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.spec.is_root()
    }

    #[inline]
    pub fn is_end_site(&self) -> bool {
        self.spec.is_end_site()
    }

    #[inline]
    pub fn parent(&self) -> Option<JointId> {
        self.spec.parent
    }

    #[inline]
    pub fn children(&self) -> &'a [JointId] {
        &self.spec.children
    }

    #[inline]
    pub fn offset(&self) -> Vector3<f64> {
        self.spec.offset
    }

    #[inline]
    pub fn raw(&self) -> &'a [f64] {
        self.pose.raw()
    }

    #[inline]
    pub fn local(&self) -> &'a Matrix4<f64> {
        &self.pose.local
    }

    #[inline]
    pub fn global(&self) -> &'a Matrix4<f64> {
        &self.pose.global
    }

    pub fn position(&self) -> Vector3<f64> {
        self.pose.position()
    }

    pub fn position_local(&self) -> Vector3<f64> {
        self.pose.position_local()
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.pose.rotation()
    }

    pub fn rotation_local(&self) -> UnitQuaternion<f64> {
        self.pose.rotation_local()
    }
}

/// Serializable snapshot of a clip's timing and playback state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSummary {
    pub num_frames: usize,
    pub channels: usize,
    pub joints: usize,
    pub frame_time: f64,
    pub frame_rate: f64,
    pub duration: f64,
    pub frame: usize,
    pub time: f64,
    pub position: f64,
    pub state: PlaybackState,
    pub looping: bool,
    pub rate: f64,
}

impl<C: Clock> Bvh<C> {
    pub fn with_clock(clock: C, config: BvhConfig) -> Self {
        Self {
            clock,
            transport: Transport::from_config(&config),
            config,
            state: ClipState::Unloaded,
        }
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Replace the clip's contents with a parsed document
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        self.state = ClipState::Unloaded;
        let (skeleton, motion) = parse_bvh(text)?;
        self.install(skeleton, motion);
        Ok(())
    }

    pub fn load_reader<R: Read>(&mut self, mut reader: R) -> Result<()> {
        self.state = ClipState::Unloaded;
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.load_str(&text)
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.state = ClipState::Unloaded;
        let text = std::fs::read_to_string(path.as_ref())?;
        self.load_str(&text)?;
        debug!(path = %path.as_ref().display(), "loaded bvh file");
        Ok(())
    }

    /// Adopt an already-built skeleton and motion
    pub fn load_parts(&mut self, skeleton: SkeletonTree, motion: MotionBuffer) -> Result<()> {
        if motion.channels() != skeleton.total_channels() {
            return Err(BvhError::FrameLength {
                expected: skeleton.total_channels(),
                found: motion.channels(),
            });
        }
        self.install(skeleton, motion);
        Ok(())
    }

    fn install(&mut self, skeleton: SkeletonTree, motion: MotionBuffer) {
        let mut pose = Pose::new(&skeleton);
        if let Some(first) = motion.frame(0) {
            if let Err(err) = pose.evaluate(&skeleton, first) {
                warn!(%err, "initial pose evaluation failed");
            }
        }
        self.transport = Transport::from_config(&self.config);
        self.state = ClipState::Loaded(Loaded {
            skeleton,
            motion,
            pose,
        });
    }

    /// Drop skeleton and motion
    pub fn unload(&mut self) {
        self.state = ClipState::Unloaded;
        self.transport = Transport::from_config(&self.config);
    }

    /// Serialize with the configured precision
    pub fn to_bvh_string(&self) -> Result<String> {
        let loaded = self.ready()?;
        let mut out = String::new();
        write_bvh(
            &mut out,
            &loaded.skeleton,
            &loaded.motion,
            self.config.write_precision,
        )?;
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let text = self.to_bvh_string()?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_bvh_string()?;
        std::fs::write(path.as_ref(), text)?;
        debug!(path = %path.as_ref().display(), "saved bvh file");
        Ok(())
    }

    /// Skeleton and motion present, regardless of frame count
    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ClipState::Loaded(_))
    }

    /// Loaded with at least one frame
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(&self.state, ClipState::Loaded(loaded) if !loaded.motion.is_empty())
    }

    fn loaded(&self) -> Option<&Loaded> {
        match &self.state {
            ClipState::Loaded(loaded) => Some(loaded),
            ClipState::Unloaded => None,
        }
    }

    fn ready(&self) -> Result<&Loaded> {
        match &self.state {
            ClipState::Loaded(loaded) if !loaded.motion.is_empty() => Ok(loaded),
            _ => {
                debug!("clip not ready");
                Err(BvhError::NotReady)
            }
        }
    }

    fn ready_mut(&mut self) -> Result<&mut Loaded> {
        match &mut self.state {
            ClipState::Loaded(loaded) if !loaded.motion.is_empty() => Ok(loaded),
            _ => {
                debug!("clip not ready");
                Err(BvhError::NotReady)
            }
        }
    }

    /// Advance playback, then evaluate the current frame
    pub fn update(&mut self) -> Result<()> {
        self.update_play_time()?;
        self.update_joints_raw()?;
        self.update_joints_matrix()
    }

    /// Move the transport to the frame implied by the clock
    pub fn update_play_time(&mut self) -> Result<()> {
        let now = self.clock.now();
        let loaded = self.ready()?;
        let (rate, frames) = (loaded.motion.frame_rate(), loaded.motion.num_frames());
        self.transport.tick(now, rate, frames);
        Ok(())
    }

    /// Copy the current frame into each joint's raw channels
    pub fn update_joints_raw(&mut self) -> Result<()> {
        let index = self.transport.frame();
        let Loaded {
            skeleton,
            motion,
            pose,
        } = self.ready_mut()?;
        let num_frames = motion.num_frames();
        let frame = motion.frame(index).ok_or(BvhError::FrameOutOfRange {
            frame: index,
            num_frames,
        })?;
        pose.load_raw(skeleton, frame)
    }

    /// Forward kinematics from the joints' raw channels
    pub fn update_joints_matrix(&mut self) -> Result<()> {
        let Loaded { skeleton, pose, .. } = self.ready_mut()?;
        pose.update_matrices(skeleton);
        Ok(())
    }

    /// Write edited local transforms back into the current frame.
    ///
    /// Joints whose rotation order cannot be decomposed keep their previous
    /// channel values; they are listed in the returned report.
    pub fn read(&mut self) -> Result<ExtractionReport> {
        let report = self.read_joints_matrix()?;
        self.read_joints_raw()?;
        Ok(report)
    }

    /// Recover each joint's raw channels from its local transform
    pub fn read_joints_matrix(&mut self) -> Result<ExtractionReport> {
        let Loaded { skeleton, pose, .. } = self.ready_mut()?;
        Ok(pose.extract_raw(skeleton))
    }

    /// Store the joints' raw channels into the current frame
    pub fn read_joints_raw(&mut self) -> Result<()> {
        let index = self.transport.frame();
        let Loaded {
            skeleton,
            motion,
            pose,
        } = self.ready_mut()?;
        let num_frames = motion.num_frames();
        let frame = motion.frame_mut(index).ok_or(BvhError::FrameOutOfRange {
            frame: index,
            num_frames,
        })?;
        pose.store_raw(skeleton, frame)
    }

    /// Whether the last [`update_play_time`](Self::update_play_time) changed frames
    #[inline]
    pub fn is_frame_new(&self) -> bool {
        self.transport.is_frame_new()
    }

    pub fn skeleton(&self) -> Option<&SkeletonTree> {
        self.loaded().map(|loaded| &loaded.skeleton)
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.loaded().map(|loaded| &loaded.pose)
    }

    /// All joints in depth-first order; empty when unloaded
    pub fn joints(&self) -> impl Iterator<Item = JointRef<'_>> + '_ {
        self.loaded().into_iter().flat_map(|loaded| {
            loaded.skeleton.joints().map(move |(id, spec)| JointRef {
                id,
                spec,
                pose: &loaded.pose[id],
            })
        })
    }

    pub fn joint(&self, id: JointId) -> Option<JointRef<'_>> {
        let loaded = self.loaded()?;
        Some(JointRef {
            id,
            spec: loaded.skeleton.get(id)?,
            pose: loaded.pose.get(id)?,
        })
    }

    /// Look up a non end-site joint by name
    pub fn joint_by_name(&self, name: &str) -> Option<JointRef<'_>> {
        let id = self.loaded()?.skeleton.find(name)?;
        self.joint(id)
    }

    pub fn num_joints(&self) -> usize {
        self.loaded().map_or(0, |loaded| loaded.skeleton.len())
    }

    /// Overwrite a joint's local transform ahead of [`read`](Self::read)
    pub fn set_local_transform(&mut self, id: JointId, local: Matrix4<f64>) -> Result<()> {
        let loaded = self.ready_mut()?;
        if loaded.pose.set_local(id, local) {
            Ok(())
        } else {
            Err(BvhError::InvalidValue {
                reason: format!("no joint with id {}", id.0),
            })
        }
    }

    pub fn motion(&self) -> Option<&MotionBuffer> {
        self.loaded().map(|loaded| &loaded.motion)
    }

    /// Mutable frames; the channel layout is still enforced by [`MotionBuffer`]
    pub fn motion_mut(&mut self) -> Option<&mut MotionBuffer> {
        match &mut self.state {
            ClipState::Loaded(loaded) => Some(&mut loaded.motion),
            ClipState::Unloaded => None,
        }
    }

    pub fn motion_frames(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.loaded()
            .into_iter()
            .flat_map(|loaded| loaded.motion.frames())
    }

    pub fn frame_values(&self, index: usize) -> Option<&[f64]> {
        self.loaded()?.motion.frame(index)
    }

    pub fn frame_values_mut(&mut self, index: usize) -> Option<&mut [f64]> {
        self.motion_mut()?.frame_mut(index)
    }

    /// Overwrite frame `index` with `values`
    pub fn store_motion(&mut self, index: usize, values: &[f64]) -> Result<()> {
        self.ready_mut()?.motion.store_frame(index, values)
    }

    /// Overwrite frame `index` with `other`'s current frame
    pub fn store_motion_from<D: Clock>(&mut self, index: usize, other: &Bvh<D>) -> Result<()> {
        let source = other.ready()?;
        let frame = other.frame();
        let values = source.motion.frame(frame).ok_or(BvhError::FrameOutOfRange {
            frame,
            num_frames: source.motion.num_frames(),
        })?;
        self.store_motion(index, values)
    }

    pub fn play(&mut self) {
        let now = self.clock.now();
        self.transport.play(now);
    }

    pub fn stop(&mut self) {
        self.transport.stop();
    }

    pub fn toggle_playing(&mut self) {
        let now = self.clock.now();
        self.transport.toggle(now);
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    #[inline]
    pub fn playback_state(&self) -> PlaybackState {
        self.transport.state()
    }

    pub fn set_rate(&mut self, rate: f64) {
        let now = self.clock.now();
        self.transport.set_rate(rate, now);
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.transport.rate()
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.transport.set_looping(looping);
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.transport.is_looping()
    }

    /// Seek to `frame`, wrapped or clamped by the loop setting
    pub fn set_frame(&mut self, frame: usize) -> Result<()> {
        let num_frames = self.ready()?.motion.num_frames();
        let now = self.clock.now();
        let frame = i64::try_from(frame).unwrap_or(i64::MAX);
        self.transport.set_frame(frame, now, num_frames);
        Ok(())
    }

    /// Seek to `seconds`; negative values seek to the start
    pub fn set_time(&mut self, seconds: f64) -> Result<()> {
        let frame_rate = self.ready()?.motion.frame_rate();
        let frame = (seconds.max(0.0) * frame_rate).floor() as usize;
        self.set_frame(frame)
    }

    /// Seek to a fraction of the clip's duration
    pub fn set_position(&mut self, ratio: f64) -> Result<()> {
        let duration = self.ready()?.motion.duration();
        self.set_time(ratio * duration)
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.transport.frame()
    }

    pub fn time(&self) -> f64 {
        self.frame() as f64 * self.frame_time().unwrap_or(0.0)
    }

    /// Current frame as a fraction of the frame count
    pub fn position(&self) -> f64 {
        match self.num_frames() {
            0 => 0.0,
            n => self.frame() as f64 / n as f64,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.motion().map_or(0, MotionBuffer::num_frames)
    }

    pub fn duration(&self) -> f64 {
        self.motion().map_or(0.0, MotionBuffer::duration)
    }

    /// Seconds per frame
    pub fn frame_time(&self) -> Option<f64> {
        self.motion().map(MotionBuffer::frame_time)
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.motion().map(MotionBuffer::frame_rate)
    }

    /// Keep frames `[begin, end)`; stops playback and rewinds to frame 0.
    ///
    /// `end <= begin` keeps every frame from `begin` on.
    pub fn crop_to_frame(&mut self, begin: usize, end: usize) -> Result<()> {
        let loaded = self.ready_mut()?;
        loaded.motion.crop(begin, end);
        let frames = loaded.motion.num_frames();
        self.transport.rewind();
        debug!(begin, end, frames, "cropped clip");
        Ok(())
    }

    pub fn crop_to_time(&mut self, begin: f64, end: f64) -> Result<()> {
        let frame_rate = self.ready()?.motion.frame_rate();
        let to_frame = |seconds: f64| (seconds * frame_rate).floor() as usize;
        self.crop_to_frame(to_frame(begin), to_frame(end))
    }

    pub fn crop_to_position(&mut self, begin: f64, end: f64) -> Result<()> {
        let duration = self.ready()?.motion.duration();
        self.crop_to_time(begin * duration, end * duration)
    }

    /// One-line description, e.g. `"120 frames, 54 channels, 0m1s duration, @ 0.01s or 100fps"`
    pub fn info(&self) -> Result<String> {
        let loaded = self.ready()?;
        let motion = &loaded.motion;
        let duration = motion.duration();
        let minutes = (duration / 60.0).floor();
        let seconds = (duration - minutes * 60.0).round();
        Ok(format!(
            "{} frames, {} channels, {}m{}s duration, @ {}s or {}fps",
            motion.num_frames(),
            motion.channels(),
            minutes,
            seconds,
            motion.frame_time(),
            motion.frame_rate()
        ))
    }

    pub fn summary(&self) -> Result<ClipSummary> {
        let loaded = self.ready()?;
        let motion = &loaded.motion;
        Ok(ClipSummary {
            num_frames: motion.num_frames(),
            channels: motion.channels(),
            joints: loaded.skeleton.len(),
            frame_time: motion.frame_time(),
            frame_rate: motion.frame_rate(),
            duration: motion.duration(),
            frame: self.frame(),
            time: self.time(),
            position: self.position(),
            state: self.transport.state(),
            looping: self.transport.is_looping(),
            rate: self.transport.rate(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ManualClock;
    use approx::assert_relative_eq;

    const SCENARIO: &str = "HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  End Site
  {
    OFFSET 0 10 0
  }
}
MOTION
Frames: 2
Frame Time: 0.1
1 2 3 0 0 0
4 5 6 0 90 0
";

    fn clip() -> Bvh<ManualClock> {
        let mut clip = Bvh::with_clock(ManualClock::new(0.0), BvhConfig::default());
        clip.load_str(SCENARIO).unwrap();
        clip
    }

    #[test]
    fn unloaded_clip_refuses_work() {
        let mut clip = Bvh::with_clock(ManualClock::new(0.0), BvhConfig::default());
        assert!(!clip.is_ready());
        assert_eq!(clip.update(), Err(BvhError::NotReady));
        assert_eq!(clip.read().unwrap_err(), BvhError::NotReady);
        assert_eq!(clip.crop_to_frame(0, 1), Err(BvhError::NotReady));
        assert_eq!(clip.set_frame(1), Err(BvhError::NotReady));
        assert_eq!(clip.info(), Err(BvhError::NotReady));
        assert!(clip.to_bvh_string().is_err());
        assert_eq!(clip.num_frames(), 0);
        assert_eq!(clip.joints().count(), 0);
        assert_eq!(clip.position(), 0.0);
    }

    #[test]
    fn failed_load_leaves_clip_unloaded() {
        let mut clip = clip();
        assert!(clip.is_ready());
        assert!(clip.load_str("HIERARCHY\nROOT Hips\n{\n  OFFSET 0 zero 0\n").is_err());
        assert!(!clip.is_loaded());
        assert!(clip.skeleton().is_none());
    }

    #[test]
    fn load_poses_the_first_frame() {
        let clip = clip();
        let hips = clip.joint_by_name("Hips").unwrap();
        assert_eq!(hips.raw(), &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(hips.position(), Vector3::new(1.0, 2.0, 3.0));
        let site = clip.joint(hips.children()[0]).unwrap();
        assert_relative_eq!(site.position(), Vector3::new(1.0, 12.0, 3.0));
    }

    #[test]
    fn update_evaluates_current_frame() {
        let mut clip = clip();
        clip.set_frame(1).unwrap();
        clip.update().unwrap();

        let hips = clip.joint_by_name("Hips").unwrap();
        assert!(hips.is_root());
        assert_eq!(hips.raw(), &[4.0, 5.0, 6.0, 0.0, 90.0, 0.0]);
        assert_relative_eq!(hips.position(), Vector3::new(4.0, 5.0, 6.0));

        // X rotation of 90 degrees turns the +Y offset into +Z.
        let site = clip.joint(hips.children()[0]).unwrap();
        assert!(site.is_end_site());
        assert_relative_eq!(site.position(), Vector3::new(4.0, 5.0, 16.0), epsilon = 1e-9);
    }

    #[test]
    fn playback_follows_the_clock() {
        let mut clip = clip();
        clip.play();
        clip.clock().set(0.15);
        clip.update().unwrap();
        assert_eq!(clip.frame(), 1);
        assert!(clip.is_frame_new());

        clip.clock().set(0.25);
        clip.update().unwrap();
        assert_eq!(clip.frame(), 0);
        assert!(clip.is_frame_new());

        clip.stop();
        clip.clock().set(5.0);
        clip.update().unwrap();
        assert_eq!(clip.frame(), 0);
        assert!(!clip.is_frame_new());
    }

    #[test]
    fn read_writes_edited_pose_into_frame() {
        let mut clip = clip();
        clip.update().unwrap();
        let hips = clip.joint_by_name("Hips").unwrap().id;
        let edited = Matrix4::new_translation(&Vector3::new(7.0, 8.0, 9.0))
            * nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), 30f64.to_radians())
                .to_homogeneous();
        clip.set_local_transform(hips, edited).unwrap();

        let report = clip.read().unwrap();
        assert!(report.is_complete());
        let frame = clip.frame_values(0).unwrap();
        let expected = [7.0, 8.0, 9.0, 0.0, 30.0, 0.0];
        for (got, want) in frame.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
        assert!(clip.set_local_transform(JointId(42), edited).is_err());
    }

    #[test]
    fn seeking_by_time_and_position() {
        let mut clip = clip();
        clip.set_time(0.15).unwrap();
        assert_eq!(clip.frame(), 1);
        assert_relative_eq!(clip.time(), 0.1);
        assert_relative_eq!(clip.position(), 0.5);

        clip.set_time(-3.0).unwrap();
        assert_eq!(clip.frame(), 0);

        clip.set_position(0.5).unwrap();
        assert_eq!(clip.frame(), 1);

        clip.set_loop(false);
        clip.set_frame(7).unwrap();
        assert_eq!(clip.frame(), 1);
    }

    #[test]
    fn crop_stops_and_rewinds() {
        let mut clip = clip();
        clip.play();
        clip.set_frame(1).unwrap();
        clip.crop_to_frame(1, 0).unwrap();
        assert_eq!(clip.num_frames(), 1);
        assert_eq!(clip.frame(), 0);
        assert!(!clip.is_playing());
        assert_eq!(clip.frame_values(0).unwrap()[0], 4.0);

        clip.crop_to_frame(3, 5).unwrap();
        assert!(!clip.is_ready());
        assert!(clip.is_loaded());
        assert_eq!(clip.update(), Err(BvhError::NotReady));
    }

    #[test]
    fn store_motion_from_copies_current_frame() {
        let mut source = clip();
        source.set_frame(1).unwrap();
        let mut target = clip();
        target.store_motion_from(0, &source).unwrap();
        assert_eq!(target.frame_values(0), source.frame_values(1));

        assert!(target.store_motion(0, &[1.0]).is_err());
        target.store_motion(1, &[0.0; 6]).unwrap();
        assert_eq!(target.motion_frames().nth(1).unwrap(), &[0.0; 6]);
    }

    #[test]
    fn info_and_summary() {
        let mut clip = clip();
        assert_eq!(
            clip.info().unwrap(),
            "2 frames, 6 channels, 0m0s duration, @ 0.1s or 10fps"
        );
        clip.set_rate(2.0);
        let summary = clip.summary().unwrap();
        assert_eq!(summary.num_frames, 2);
        assert_eq!(summary.joints, 2);
        assert_eq!(summary.state, PlaybackState::Stopped);
        assert_eq!(summary.rate, 2.0);

        let json = serde_json::to_string(&summary).unwrap();
        let back: ClipSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn saved_text_reloads() {
        let clip = clip();
        let mut bytes = Vec::new();
        clip.write_to(&mut bytes).unwrap();

        let mut again = Bvh::with_clock(ManualClock::new(0.0), BvhConfig::default());
        again.load_reader(bytes.as_slice()).unwrap();
        assert_eq!(again.motion(), clip.motion());
        assert_eq!(again.skeleton(), clip.skeleton());
    }
}
