//! Frame encoder
//!
//! Turns the current poses into one delimited text record. Floats are written
//! with Rust's shortest round-trip formatting, integer prefix fields as
//! integers, one `,` between values and no trailing newline (the sink
//! terminates lines).

use super::schema::{PrefixField, Schema};
use crate::tracking::PoseSource;
use std::fmt::Write;

/// Field delimiter
pub const DELIMITER: char = ',';

/// Values written before the entity blocks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrefixValues {
    /// Seconds since session start
    pub time: f32,
    /// Current score
    pub score: Option<i32>,
    /// Index of the live task object shape
    pub shape_index: Option<usize>,
}

impl PrefixValues {
    /// Prefix carrying only a time
    pub fn at(time: f32) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Set the score
    pub fn with_score(mut self, score: i32) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the shape index
    pub fn with_shape(mut self, shape_index: usize) -> Self {
        self.shape_index = Some(shape_index);
        self
    }

    fn write_field(&self, field: PrefixField, out: &mut String) {
        // Writing to a String cannot fail
        let _ = match field {
            PrefixField::Time => write!(out, "{}", self.time),
            PrefixField::Score => write!(out, "{}", self.score.unwrap_or(0)),
            PrefixField::ShapeNum => write!(out, "{}", self.shape_index.unwrap_or(0)),
        };
    }
}

/// Encode the header record (column names)
pub fn encode_header(schema: &Schema) -> String {
    schema.header_fields().join(",")
}

/// Encode one record from the current poses
pub fn encode<P>(schema: &Schema, prefix: &PrefixValues, source: &P) -> String
where
    P: PoseSource + ?Sized,
{
    // Most fields fit in ~10 characters
    let mut out = String::with_capacity(schema.record_width() * 10);
    let mut first = true;

    for field in schema.prefix() {
        if !first {
            out.push(DELIMITER);
        }
        first = false;
        prefix.write_field(*field, &mut out);
    }

    for entry in schema.entries() {
        let pose = source.current_pose(&entry.entity);
        for value in pose.to_fields() {
            if !first {
                out.push(DELIMITER);
            }
            first = false;
            let _ = write!(out, "{}", value);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::schema::{build_schema, game_layout};
    use crate::tracking::{HandSkeleton, SkeletonProvider};
    use crate::types::{BoneRange, EntityId, Pose, Quat, Side, Vec3};

    struct Fixed;

    impl SkeletonProvider for Fixed {
        fn bone_range(&self, _side: Side) -> BoneRange {
            BoneRange::empty()
        }

        fn bone_label(&self, _side: Side, index: u32) -> String {
            index.to_string()
        }
    }

    impl PoseSource for Fixed {
        fn current_pose(&self, entity: &EntityId) -> Pose {
            match entity {
                EntityId::Head => Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::new(1.0, 0.0, 0.0, 0.0)),
                _ => Pose::new(Vec3::new(0.5, -10.0, 0.25), Quat::new(0.5, 0.5, 0.5, 0.5)),
            }
        }
    }

    #[test]
    fn test_encode_small_record() {
        let schema = build_schema(
            &[PrefixField::Time],
            &[EntityId::Head, EntityId::Hand(Side::Left)],
            &Fixed,
        );
        let line = encode(&schema, &PrefixValues::at(1.0), &Fixed);
        assert_eq!(line, "1,0,1,0,1,0,0,0,0.5,-10,0.25,0.5,0.5,0.5,0.5");
    }

    #[test]
    fn test_integer_prefix_fields() {
        let schema = game_layout(&HandSkeleton::none());
        let prefix = PrefixValues::at(0.5).with_score(-2).with_shape(1);
        let line = encode(&schema, &prefix, &Fixed);
        assert!(line.starts_with("0.5,-2,1,"));
        assert_eq!(line.split(',').count(), schema.record_width());
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_header_matches_width() {
        let schema = game_layout(&HandSkeleton::full());
        let header = encode_header(&schema);
        assert_eq!(header.split(',').count(), schema.record_width());
        assert!(header.starts_with("time,score,shapeNum,shape_position_x"));
    }
}
