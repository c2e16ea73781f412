//! Frame decoder
//!
//! Parses one record back into poses using the live [`Schema`]. Records are
//! positional: the field count is validated against the schema width before
//! anything is read, and every field must parse as a number.

use super::encoder::{PrefixValues, DELIMITER};
use super::schema::{PrefixField, Schema, FIELDS_PER_ENTITY};
use crate::error::{PoseReplayError, Result};
use crate::types::{Pose, Role, Vec3};

/// One decoded entity block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedSample {
    /// Recorded pose
    pub pose: Pose,
    /// False when a tracked hand carried the tracking-loss sentinel
    pub present: bool,
}

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Prefix scalars
    pub prefix: PrefixValues,
    /// One sample per schema entry, in schema order
    pub samples: Vec<DecodedSample>,
}

/// Decoder bound to a tracking-loss sentinel position
#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder {
    sentinel: Vec3,
}

impl FrameDecoder {
    /// Create a decoder; hands recorded exactly at `sentinel` are marked absent
    pub fn new(sentinel: Vec3) -> Self {
        Self { sentinel }
    }

    /// Tracking-loss sentinel position
    pub fn sentinel(&self) -> Vec3 {
        self.sentinel
    }

    /// Decode one record
    pub fn decode(&self, schema: &Schema, record: &str) -> Result<DecodedFrame> {
        let fields: Vec<&str> = split_fields(record).collect();

        let expected = schema.record_width();
        if fields.len() < expected {
            return Err(PoseReplayError::SchemaMismatch {
                expected,
                found: fields.len(),
            });
        }

        let mut prefix = PrefixValues::default();
        for (column, field) in schema.prefix().iter().enumerate() {
            let raw = fields[column];
            match field {
                PrefixField::Time => prefix.time = parse_float(column, raw)?,
                PrefixField::Score => prefix.score = Some(parse_int(column, raw)?),
                PrefixField::ShapeNum => {
                    let value = parse_int(column, raw)?;
                    let index = usize::try_from(value)
                        .map_err(|_| malformed(column, raw))?;
                    prefix.shape_index = Some(index);
                }
            }
        }

        let mut samples = Vec::with_capacity(schema.len());
        for (i, entry) in schema.entries().iter().enumerate() {
            let offset = schema.entry_offset(i);
            let mut block = [0.0f32; FIELDS_PER_ENTITY];
            for (k, slot) in block.iter_mut().enumerate() {
                let column = offset + k;
                *slot = parse_float(column, fields[column])?;
            }

            let pose = Pose::from_fields(block);
            let present = match entry.role {
                Role::TrackedHand(_) => pose.position != self.sentinel,
                _ => true,
            };
            samples.push(DecodedSample { pose, present });
        }

        Ok(DecodedFrame { prefix, samples })
    }
}

/// Split a record into non-empty fields
pub fn split_fields(record: &str) -> impl Iterator<Item = &str> {
    record
        .trim_end_matches(['\r', '\n'])
        .split(DELIMITER)
        .map(str::trim)
        .filter(|f| !f.is_empty())
}

fn malformed(column: usize, raw: &str) -> PoseReplayError {
    PoseReplayError::MalformedField {
        column,
        value: raw.to_string(),
    }
}

fn parse_float(column: usize, raw: &str) -> Result<f32> {
    raw.parse::<f32>().map_err(|_| malformed(column, raw))
}

fn parse_int(column: usize, raw: &str) -> Result<i32> {
    raw.parse::<i32>().map_err(|_| malformed(column, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::schema::{build_schema, game_layout};
    use crate::tracking::HandSkeleton;
    use crate::types::{EntityId, Quat, Side};

    fn head_and_left_hand() -> Schema {
        build_schema(
            &[PrefixField::Time],
            &[EntityId::Head, EntityId::Hand(Side::Left)],
            &HandSkeleton::none(),
        )
    }

    #[test]
    fn test_decode_small_record() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::new(0.0, 2.0, 0.0));
        let frame = decoder
            .decode(&schema, "1.0,0,1,0,1,0,0,0,0,-10,0,1,0,0,0")
            .unwrap();

        assert_eq!(frame.prefix.time, 1.0);
        assert_eq!(frame.samples[0].pose.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(frame.samples[0].pose.orientation, Quat::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(frame.samples[1].pose.position, Vec3::new(0.0, -10.0, 0.0));
        assert!(frame.samples[1].present);
    }

    #[test]
    fn test_sentinel_marks_hand_absent() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::new(0.0, -10.0, 0.0));
        let frame = decoder
            .decode(&schema, "1.0,0,1,0,1,0,0,0,0,-10,0,1,0,0,0")
            .unwrap();
        assert!(frame.samples[0].present);
        assert!(!frame.samples[1].present);

        let near = decoder
            .decode(&schema, "1.0,0,1,0,1,0,0,0,0,-10.0001,0,1,0,0,0")
            .unwrap();
        assert!(near.samples[1].present);
    }

    #[test]
    fn test_sentinel_only_applies_to_hands() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::new(0.0, 1.0, 0.0));
        let frame = decoder
            .decode(&schema, "1.0,0,1,0,1,0,0,0,0,-10,0,1,0,0,0")
            .unwrap();
        assert!(frame.samples[0].present);
    }

    #[test]
    fn test_short_record_is_schema_mismatch() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::zeros());
        let err = decoder.decode(&schema, "1.0,0,1,0").unwrap_err();
        assert!(matches!(
            err,
            PoseReplayError::SchemaMismatch {
                expected: 15,
                found: 4
            }
        ));
    }

    #[test]
    fn test_empty_fragments_discarded() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::zeros());
        let frame = decoder
            .decode(&schema, "1.0,,0,1,0,1,0,0,0,0,-10,0,1,0,0,0,\r\n")
            .unwrap();
        assert_eq!(frame.samples[1].pose.position.y, -10.0);
    }

    #[test]
    fn test_malformed_field_reports_column() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::zeros());
        let err = decoder
            .decode(&schema, "1.0,0,1,0,1,0,0,0,0,abc,0,1,0,0,0")
            .unwrap_err();
        match err {
            PoseReplayError::MalformedField { column, value } => {
                assert_eq!(column, 9);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_integer_prefix_must_be_integral() {
        let schema = game_layout(&HandSkeleton::none());
        let decoder = FrameDecoder::new(Vec3::zeros());
        let mut fields = vec!["0.5".to_string(), "1.5".to_string(), "0".to_string()];
        fields.extend(std::iter::repeat("0".to_string()).take(42));
        let err = decoder.decode(&schema, &fields.join(",")).unwrap_err();
        assert!(matches!(err, PoseReplayError::MalformedField { column: 1, .. }));

        fields[1] = "7".to_string();
        fields[2] = "1".to_string();
        let frame = decoder.decode(&schema, &fields.join(",")).unwrap();
        assert_eq!(frame.prefix.score, Some(7));
        assert_eq!(frame.prefix.shape_index, Some(1));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let schema = head_and_left_hand();
        let decoder = FrameDecoder::new(Vec3::zeros());
        let frame = decoder
            .decode(&schema, "1.0,0,1,0,1,0,0,0,0,-10,0,1,0,0,0,9,9,9")
            .unwrap();
        assert_eq!(frame.samples.len(), 2);
    }
}
