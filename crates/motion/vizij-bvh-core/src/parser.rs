//! BVH text parser.
//!
//! The hierarchy is read token by token (joint names run to the end of their
//! line); the motion section is read line by line, one frame per line.

use std::io::Read;
use std::str::FromStr;

use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::euler::Axis;
use crate::motion::MotionBuffer;
use crate::skeleton::{JointId, JointKind, RotationOrder, SkeletonBuilder, SkeletonTree};
use crate::BvhError;

/// Whitespace tokenizer that tracks line numbers for error reporting.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        let trimmed = rest.trim_start();
        let skipped = &rest[..rest.len() - trimmed.len()];
        self.line += skipped.matches('\n').count();
        self.pos += skipped.len();
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    fn expect_token(&mut self, expected: &str) -> Result<&'a str, BvhError> {
        self.next_token().ok_or_else(|| BvhError::UnexpectedEof {
            expected: expected.to_string(),
        })
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), BvhError> {
        let token = self.expect_token(keyword)?;
        if token != keyword {
            return Err(self.unexpected(token));
        }
        Ok(())
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, BvhError> {
        let token = self.expect_token(field)?;
        token.parse().map_err(|_| BvhError::MalformedNumber {
            field,
            token: token.to_string(),
            line: self.line,
        })
    }

    /// Remainder of the current line, trimmed; consumes the line break
    fn rest_of_line(&mut self) -> &'a str {
        let rest = &self.text[self.pos..];
        match rest.find('\n') {
            Some(end) => {
                self.pos += end + 1;
                self.line += 1;
                rest[..end].trim()
            }
            None => {
                self.pos = self.text.len();
                rest.trim()
            }
        }
    }

    /// Remaining lines with their line numbers
    fn lines(self) -> impl Iterator<Item = (usize, &'a str)> {
        let first = self.line;
        self.text[self.pos..]
            .lines()
            .enumerate()
            .map(move |(n, line)| (first + n, line))
    }

    fn unexpected(&self, token: &str) -> BvhError {
        BvhError::UnexpectedToken {
            token: token.to_string(),
            line: self.line,
        }
    }
}

/// Parse a complete BVH document into its skeleton and motion.
///
/// Any grammar violation aborts the whole parse; nothing partial is returned.
pub fn parse_bvh(text: &str) -> Result<(SkeletonTree, MotionBuffer), BvhError> {
    let mut tokens = Tokens::new(text);
    let skeleton = parse_hierarchy(&mut tokens)?;
    let motion = parse_motion(tokens, skeleton.total_channels())?;
    debug!(
        joints = skeleton.len(),
        channels = skeleton.total_channels(),
        frames = motion.num_frames(),
        "parsed bvh"
    );
    Ok((skeleton, motion))
}

/// Read a whole stream and parse it as BVH
pub fn read_bvh<R: Read>(mut reader: R) -> Result<(SkeletonTree, MotionBuffer), BvhError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_bvh(&text)
}

fn parse_hierarchy(tokens: &mut Tokens<'_>) -> Result<SkeletonTree, BvhError> {
    tokens.expect_keyword("HIERARCHY")?;

    let mut builder = SkeletonBuilder::new();
    // Innermost open joint block; `None` before the root opens and after it closes.
    let mut cursor: Option<JointId> = None;

    loop {
        let token = tokens.expect_token("MOTION")?;
        match token {
            "ROOT" | "JOINT" | "End" => {
                let kind = match token {
                    "ROOT" => JointKind::Root,
                    "JOINT" => JointKind::Joint,
                    _ => JointKind::EndSite,
                };
                // Exactly one root, and every other joint nests inside it.
                let is_first = builder.is_empty();
                if (kind == JointKind::Root) != is_first || (!is_first && cursor.is_none()) {
                    return Err(tokens.unexpected(token));
                }
                let name = tokens.rest_of_line();
                let id = builder.add_joint(kind, name, cursor);
                tokens.expect_keyword("{")?;
                cursor = Some(id);
            }
            "}" => {
                let current = cursor.ok_or_else(|| tokens.unexpected(token))?;
                cursor = builder.parent(current);
            }
            "OFFSET" => {
                let current = cursor.ok_or_else(|| tokens.unexpected(token))?;
                let x = tokens.number("offset")?;
                let y = tokens.number("offset")?;
                let z = tokens.number("offset")?;
                builder.set_offset(current, Vector3::new(x, y, z));
            }
            "CHANNELS" => {
                let current = cursor.ok_or_else(|| tokens.unexpected(token))?;
                let count: usize = tokens.number("channel count")?;
                let mut labels = Vec::with_capacity(count);
                for _ in 0..count {
                    labels.push(tokens.expect_token("channel name")?);
                }
                let joint = builder.name(current).unwrap_or_default().to_string();
                if count < 3 {
                    return Err(BvhError::InvalidChannels { joint, count });
                }
                let order = rotation_order(&joint, &labels[count - 3..])?;
                builder.set_channels(current, count, order)?;
            }
            "MOTION" if cursor.is_none() && !builder.is_empty() => break,
            _ => return Err(tokens.unexpected(token)),
        }
    }

    builder.build()
}

/// Rotation order from the first letters of the last three channel labels
fn rotation_order(joint: &str, labels: &[&str]) -> Result<RotationOrder, BvhError> {
    let letters: String = labels.iter().filter_map(|l| l.chars().next()).collect();
    let invalid = || BvhError::InvalidRotationOrder {
        joint: joint.to_string(),
        order: letters.clone(),
    };
    let mut axes = [Axis::X; 3];
    for (slot, letter) in axes.iter_mut().zip(letters.chars()) {
        *slot = Axis::from_letter(letter).ok_or_else(invalid)?;
    }
    RotationOrder::from_axes(axes).ok_or_else(invalid)
}

fn parse_motion(mut tokens: Tokens<'_>, channels: usize) -> Result<MotionBuffer, BvhError> {
    tokens.expect_keyword("Frames:")?;
    let num_frames: usize = tokens.number("frame count")?;
    tokens.expect_keyword("Frame")?;
    tokens.expect_keyword("Time:")?;
    let frame_time: f64 = tokens.number("frame time")?;
    tokens.rest_of_line();

    let mut motion = MotionBuffer::new(channels, frame_time)?;
    let mut lines = tokens.lines().filter(|(_, line)| !line.trim().is_empty());
    let mut extra_values = 0usize;

    for frame in 0..num_frames {
        let (line_no, line) = lines.next().ok_or_else(|| BvhError::UnexpectedEof {
            expected: format!("{num_frames} frames, found {frame}"),
        })?;
        let mut fields = line.split_whitespace();
        let mut values = Vec::with_capacity(channels);
        for field in fields.by_ref().take(channels) {
            let value = field.parse().map_err(|_| BvhError::MalformedNumber {
                field: "channel value",
                token: field.to_string(),
                line: line_no,
            })?;
            values.push(value);
        }
        if values.len() < channels {
            return Err(BvhError::ShortFrame {
                frame,
                expected: channels,
                found: values.len(),
            });
        }
        extra_values += fields.count();
        motion.push_frame(values)?;
    }

    if extra_values > 0 {
        warn!(extra_values, "ignored values beyond the channel layout");
    }
    Ok(motion)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  End Site
  {
    OFFSET 0 5 0
  }
}
MOTION
Frames: 2
Frame Time: 0.0333333
1 2 3 0 0 0
4 5 6 10 20 30
";

    #[test]
    fn parses_minimal_clip() {
        let (skeleton, motion) = parse_bvh(MINIMAL).unwrap();
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton.total_channels(), 6);
        let hips = skeleton.joint_by_name("Hips").unwrap();
        assert_eq!(hips.rotation_order, Some(RotationOrder::ZXY));
        let site = &skeleton[hips.children[0]];
        assert!(site.is_end_site());
        assert_eq!(site.name, "Site");
        assert_eq!(site.offset, Vector3::new(0.0, 5.0, 0.0));

        assert_eq!(motion.num_frames(), 2);
        assert_eq!(motion.frame_time(), 0.0333333);
        assert_eq!(motion.frame(1).unwrap(), &[4.0, 5.0, 6.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn names_run_to_end_of_line() {
        let text = MINIMAL.replace("ROOT Hips", "ROOT Left Hip Joint\r");
        let (skeleton, _) = parse_bvh(&text).unwrap();
        assert!(skeleton.find("Left Hip Joint").is_some());
    }

    #[test]
    fn unknown_token_is_fatal() {
        let text = MINIMAL.replace("OFFSET 0 5 0", "BONE 0 5 0");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::UnexpectedToken { ref token, line: 8 }) if token == "BONE"
        ));
    }

    #[test]
    fn malformed_offset_is_fatal() {
        let text = MINIMAL.replace("OFFSET 0 5 0", "OFFSET 0 five 0");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::MalformedNumber { field: "offset", .. })
        ));
    }

    #[test]
    fn short_frame_is_fatal() {
        let text = MINIMAL.replace("4 5 6 10 20 30", "4 5 6 10");
        assert_eq!(
            parse_bvh(&text).unwrap_err(),
            BvhError::ShortFrame {
                frame: 1,
                expected: 6,
                found: 4
            }
        );
    }

    #[test]
    fn missing_frames_is_fatal() {
        let text = MINIMAL.replace("Frames: 2", "Frames: 3");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn extra_values_are_ignored() {
        let text = MINIMAL.replace("1 2 3 0 0 0", "1 2 3 0 0 0 99");
        let (_, motion) = parse_bvh(&text).unwrap();
        assert_eq!(motion.frame(0).unwrap().len(), 6);
    }

    #[test]
    fn invalid_rotation_labels_are_fatal() {
        let text = MINIMAL.replace("Zrotation Xrotation Yrotation", "Zrotation Zrotation Yrotation");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::InvalidRotationOrder { ref order, .. }) if order == "ZZY"
        ));
    }

    #[test]
    fn channels_on_end_site_are_fatal() {
        let text = MINIMAL.replace("OFFSET 0 5 0", "OFFSET 0 5 0\n    CHANNELS 3 Zrotation Xrotation Yrotation");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::InvalidChannels { count: 3, .. })
        ));
    }

    #[test]
    fn second_root_is_fatal() {
        let text = MINIMAL.replace("MOTION", "ROOT Other\n{\n}\nMOTION");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::UnexpectedToken { ref token, .. }) if token == "ROOT"
        ));
    }

    #[test]
    fn zero_frame_time_is_rejected() {
        let text = MINIMAL.replace("Frame Time: 0.0333333", "Frame Time: 0");
        assert!(matches!(
            parse_bvh(&text),
            Err(BvhError::InvalidFrameTime { .. })
        ));
    }

    #[test]
    fn reads_from_stream() {
        let (skeleton, motion) = read_bvh(MINIMAL.as_bytes()).unwrap();
        assert_eq!(skeleton.total_channels(), motion.channels());
    }
}
