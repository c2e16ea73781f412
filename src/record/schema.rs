//! Column layout of a record stream
//!
//! A [`Schema`] is the ordered list of prefix fields and tracked entities a
//! session reads and writes. Each entity contributes seven columns in the
//! order position x/y/z, orientation w/x/y/z. The layout is resolved once per
//! session from the skeleton capability and carried explicitly; the column
//! order, by position, is the contract between recorder and replay.

use crate::tracking::SkeletonProvider;
use crate::types::{EntityId, Role, Side};

/// Scalars per entity block
pub const FIELDS_PER_ENTITY: usize = 7;

/// Column suffixes of one entity block, in wire order
pub const FIELD_SUFFIXES: [&str; FIELDS_PER_ENTITY] = [
    "position_x",
    "position_y",
    "position_z",
    "quaternion_w",
    "quaternion_x",
    "quaternion_y",
    "quaternion_z",
];

/// Scalar fields that precede the entity blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixField {
    /// Seconds since session start (float)
    Time,
    /// Current score (integer)
    Score,
    /// Index of the live task object shape (integer)
    ShapeNum,
}

impl PrefixField {
    /// Header column name
    pub fn name(&self) -> &'static str {
        match self {
            PrefixField::Time => "time",
            PrefixField::Score => "score",
            PrefixField::ShapeNum => "shapeNum",
        }
    }

    /// True when the field is written and parsed as an integer
    pub fn is_integer(&self) -> bool {
        !matches!(self, PrefixField::Time)
    }
}

/// One tracked entity in the layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Column name stem (`head`, `left_Hand_Thumb0`, ...)
    pub name: String,
    /// Entity sampled for this block
    pub entity: EntityId,
    /// How replay applies this block
    pub role: Role,
}

impl SchemaEntry {
    /// Entry for a fixed entity; `None` for bones, which need a label
    pub fn fixed(entity: EntityId) -> Option<Self> {
        entity.fixed_name().map(|name| Self {
            name: name.to_string(),
            entity,
            role: entity.role(),
        })
    }

    /// Entry for a skeletal bone
    pub fn bone(side: Side, index: u32, label: &str) -> Self {
        let entity = EntityId::Bone { side, index };
        Self {
            name: format!("{}_{}", side.prefix(), label),
            entity,
            role: entity.role(),
        }
    }

    /// The seven column names of this entry
    pub fn column_names(&self) -> impl Iterator<Item = String> + '_ {
        FIELD_SUFFIXES
            .iter()
            .map(move |suffix| format!("{}_{}", self.name, suffix))
    }
}

/// Ordered prefix fields plus entity blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    prefix: Vec<PrefixField>,
    entries: Vec<SchemaEntry>,
    gaze_origin: Option<usize>,
}

impl Schema {
    /// Create a schema from explicit parts
    pub fn new(prefix: Vec<PrefixField>, entries: Vec<SchemaEntry>) -> Self {
        let gaze_origin = entries.iter().position(|e| e.entity == EntityId::Head);
        Self {
            prefix,
            entries,
            gaze_origin,
        }
    }

    /// Prefix fields in order
    pub fn prefix(&self) -> &[PrefixField] {
        &self.prefix
    }

    /// Entity entries in order
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Number of entity entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entity entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of prefix scalars
    pub fn prefix_width(&self) -> usize {
        self.prefix.len()
    }

    /// Number of scalars in one record
    pub fn record_width(&self) -> usize {
        self.prefix_width() + FIELDS_PER_ENTITY * self.len()
    }

    /// Column offset of entry `i`
    pub fn entry_offset(&self, i: usize) -> usize {
        self.prefix_width() + FIELDS_PER_ENTITY * i
    }

    /// Position of a prefix field, if present
    pub fn prefix_index(&self, field: PrefixField) -> Option<usize> {
        self.prefix.iter().position(|f| *f == field)
    }

    /// Index of the head entry that gaze rays start from
    pub fn gaze_origin(&self) -> Option<usize> {
        self.gaze_origin
    }

    /// Header column names: prefix names, then seven names per entry
    pub fn header_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.record_width());
        fields.extend(self.prefix.iter().map(|p| p.name().to_string()));
        for entry in &self.entries {
            fields.extend(entry.column_names());
        }
        fields
    }
}

/// Build the layout for one session
///
/// Fixed entities come first in the given order, then every left bone in the
/// skeleton's current range, then every right bone.
pub fn build_schema<S>(prefix: &[PrefixField], fixed: &[EntityId], skeleton: &S) -> Schema
where
    S: SkeletonProvider + ?Sized,
{
    let mut entries: Vec<SchemaEntry> = fixed
        .iter()
        .filter_map(|e| SchemaEntry::fixed(*e))
        .collect();

    for side in Side::BOTH {
        for index in skeleton.bone_range(side).iter() {
            let label = skeleton.bone_label(side, index);
            entries.push(SchemaEntry::bone(side, index, &label));
        }
    }

    Schema::new(prefix.to_vec(), entries)
}

/// Prefix fields written during game mode
pub const GAME_PREFIX: [PrefixField; 3] =
    [PrefixField::Time, PrefixField::Score, PrefixField::ShapeNum];

/// Fixed entities written during game mode
pub const GAME_ENTITIES: [EntityId; 6] = [
    EntityId::TaskObject,
    EntityId::Head,
    EntityId::Hand(Side::Left),
    EntityId::Hand(Side::Right),
    EntityId::Eye(Side::Left),
    EntityId::Eye(Side::Right),
];

/// Game-mode layout for the given skeleton
pub fn game_layout<S>(skeleton: &S) -> Schema
where
    S: SkeletonProvider + ?Sized,
{
    build_schema(&GAME_PREFIX, &GAME_ENTITIES, skeleton)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::HandSkeleton;
    use crate::types::BoneRange;

    struct Labels(Vec<&'static str>);

    impl SkeletonProvider for Labels {
        fn bone_range(&self, side: Side) -> BoneRange {
            match side {
                Side::Left => BoneRange::new(0, self.0.len() as u32),
                Side::Right => BoneRange::empty(),
            }
        }

        fn bone_label(&self, _side: Side, index: u32) -> String {
            self.0[index as usize].to_string()
        }
    }

    #[test]
    fn test_bone_columns_in_order() {
        let schema = build_schema(&[], &[], &Labels(vec!["Wrist", "Thumb0"]));
        let header = schema.header_fields();
        assert_eq!(header.len(), 14);
        assert_eq!(header[0], "left_Wrist_position_x");
        assert_eq!(header[6], "left_Wrist_quaternion_z");
        assert_eq!(header[7], "left_Thumb0_position_x");
        assert_eq!(header[13], "left_Thumb0_quaternion_z");
    }

    #[test]
    fn test_empty_range_yields_fixed_only() {
        let schema = game_layout(&HandSkeleton::none());
        assert_eq!(schema.len(), 6);
        assert_eq!(schema.record_width(), 3 + 42);
        let names: Vec<_> = schema.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["shape", "head", "leftHand", "rightHand", "leftEye", "rightEye"]
        );
    }

    #[test]
    fn test_full_game_layout() {
        let schema = game_layout(&HandSkeleton::full());
        assert_eq!(schema.len(), 6 + 48);
        assert_eq!(schema.entries()[6].name, "left_Hand_WristRoot");
        assert_eq!(schema.entries()[30].name, "right_Hand_WristRoot");
        assert_eq!(schema.gaze_origin(), Some(1));
        assert_eq!(schema.header_fields()[..3], ["time", "score", "shapeNum"]);
    }

    #[test]
    fn test_roles_resolved_at_build() {
        let schema = game_layout(&HandSkeleton::none());
        let roles: Vec<_> = schema.entries().iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            [
                Role::ActiveObjectSlot,
                Role::Position,
                Role::TrackedHand(Side::Left),
                Role::TrackedHand(Side::Right),
                Role::GazeRay(Side::Left),
                Role::GazeRay(Side::Right),
            ]
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let skeleton = HandSkeleton::full().with_range(Side::Right, BoneRange::new(2, 10));
        assert_eq!(game_layout(&skeleton), game_layout(&skeleton));
    }

    #[test]
    fn test_no_head_means_no_gaze_origin() {
        let schema = build_schema(
            &[PrefixField::Time],
            &[EntityId::Eye(Side::Left)],
            &HandSkeleton::none(),
        );
        assert_eq!(schema.gaze_origin(), None);
        assert_eq!(schema.entry_offset(0), 1);
    }
}
