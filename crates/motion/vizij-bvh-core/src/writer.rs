//! BVH text serializer.

use std::fmt::{self, Write};

use crate::motion::MotionBuffer;
use crate::skeleton::{JointId, JointKind, SkeletonTree};
use crate::BvhError;

const INDENT: &str = "  ";

/// Write `skeleton` and `motion` as a BVH document.
///
/// With `precision == None` each value uses the shortest text that parses
/// back to the same `f64`.
pub fn write_bvh<W: Write>(
    out: &mut W,
    skeleton: &SkeletonTree,
    motion: &MotionBuffer,
    precision: Option<usize>,
) -> Result<(), BvhError> {
    writeln!(out, "HIERARCHY")?;
    write_joint(out, skeleton, skeleton.root(), precision)?;
    write_motion(out, motion, precision)?;
    Ok(())
}

/// Serialize to an owned string
pub fn to_bvh_string(
    skeleton: &SkeletonTree,
    motion: &MotionBuffer,
    precision: Option<usize>,
) -> Result<String, BvhError> {
    let mut out = String::new();
    write_bvh(&mut out, skeleton, motion, precision)?;
    Ok(out)
}

fn write_joint<W: Write>(
    out: &mut W,
    skeleton: &SkeletonTree,
    id: JointId,
    precision: Option<usize>,
) -> fmt::Result {
    let joint = &skeleton[id];
    let tabs = INDENT.repeat(joint.depth);
    writeln!(out, "{tabs}{} {}", joint.kind.keyword(), joint.name)?;
    writeln!(out, "{tabs}{{")?;

    let offset = &joint.offset;
    writeln!(
        out,
        "{tabs}{INDENT}OFFSET {} {} {}",
        Value(offset.x, precision),
        Value(offset.y, precision),
        Value(offset.z, precision)
    )?;

    if joint.kind != JointKind::EndSite {
        if let Some(order) = joint.rotation_order {
            write!(out, "{tabs}{INDENT}CHANNELS {}", joint.channels)?;
            if joint.has_position_channels() {
                write!(out, " Xposition Yposition Zposition")?;
            }
            for axis in order.axes() {
                write!(out, " {}rotation", axis.letter())?;
            }
            writeln!(out)?;
        }
    }

    for child in &joint.children {
        write_joint(out, skeleton, *child, precision)?;
    }
    writeln!(out, "{tabs}}}")
}

fn write_motion<W: Write>(
    out: &mut W,
    motion: &MotionBuffer,
    precision: Option<usize>,
) -> fmt::Result {
    writeln!(out, "MOTION")?;
    writeln!(out, "Frames:\t{}", motion.num_frames())?;
    writeln!(out, "Frame Time:\t{}", motion.frame_time())?;
    for frame in motion.frames() {
        let mut first = true;
        for value in frame {
            if !first {
                out.write_char(' ')?;
            }
            write!(out, "{}", Value(*value, precision))?;
            first = false;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Channel value with optional fixed precision.
struct Value(f64, Option<usize>);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(precision) => write!(f, "{:.*}", precision, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
