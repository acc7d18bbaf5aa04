//! Per-frame channel samples.

use crate::BvhError;

/// Ordered frames of channel values sharing one frame time.
///
/// Every frame holds exactly [`channels`](Self::channels) values; frames are
/// only ever handed out as fixed-length slices so the layout cannot drift.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionBuffer {
    channels: usize,
    frame_time: f64,
    frames: Vec<Vec<f64>>,
}

impl MotionBuffer {
    /// Create an empty buffer; `frame_time` is seconds per frame and must be positive
    pub fn new(channels: usize, frame_time: f64) -> Result<Self, BvhError> {
        if !(frame_time.is_finite() && frame_time > 0.0) {
            return Err(BvhError::InvalidFrameTime { frame_time });
        }
        Ok(Self {
            channels,
            frame_time,
            frames: Vec::new(),
        })
    }

    /// Append a frame, rejecting any vector whose length breaks the layout
    pub fn push_frame(&mut self, values: Vec<f64>) -> Result<(), BvhError> {
        self.check_len(values.len())?;
        self.frames.push(values);
        Ok(())
    }

    /// Overwrite frame `index` with `values`
    pub fn store_frame(&mut self, index: usize, values: &[f64]) -> Result<(), BvhError> {
        self.check_len(values.len())?;
        let num_frames = self.frames.len();
        let frame = self
            .frames
            .get_mut(index)
            .ok_or(BvhError::FrameOutOfRange {
                frame: index,
                num_frames,
            })?;
        frame.copy_from_slice(values);
        Ok(())
    }

    #[inline]
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    #[inline]
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut [f64]> {
        self.frames.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn frames(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.frames.iter().map(Vec::as_slice)
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut [f64]> + '_ {
        self.frames.iter_mut().map(Vec::as_mut_slice)
    }

    /// Values per frame
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds per frame
    #[inline]
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Frames per second
    #[inline]
    pub fn frame_rate(&self) -> f64 {
        1.0 / self.frame_time
    }

    /// Total length in seconds
    #[inline]
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 * self.frame_time
    }

    /// Keep only frames in `[begin, end)`.
    ///
    /// `end <= begin` keeps everything from `begin` on; the buffer never grows.
    pub fn crop(&mut self, begin: usize, end: usize) {
        let begin = begin.min(self.frames.len());
        self.frames.drain(..begin);
        if end > begin {
            self.frames.truncate(end - begin);
        }
    }

    fn check_len(&self, found: usize) -> Result<(), BvhError> {
        if found != self.channels {
            return Err(BvhError::FrameLength {
                expected: self.channels,
                found,
            });
        }
        Ok(())
    }
}
