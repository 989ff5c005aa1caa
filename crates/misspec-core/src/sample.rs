use serde::{Deserialize, Serialize};

use crate::Features;

/// Binary class label.
///
/// Declaration order is the class-priority order used when discriminant
/// scores tie: [`Label::Zero`] wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::IsVariant,
)]
pub enum Label {
    Zero,
    One,
}

impl Label {
    /// Number of classes.
    pub const LEN: usize = 2;

    /// All labels, in priority order.
    pub const ALL: [Label; Label::LEN] = [Label::Zero, Label::One];

    /// Dense index of the label (`0` or `1`).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Label::Zero => 0,
            Label::One => 1,
        }
    }

    /// The opposite class.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Label::Zero => Label::One,
            Label::One => Label::Zero,
        }
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        if value { Label::One } else { Label::Zero }
    }
}

/// Row identifier, unique within a [`Sample`] and stable across the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
pub struct RowId(pub u32);

/// One labeled observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RowId,
    pub features: Features,
    pub label: Label,
}

/// An ordered sequence of labeled records.
///
/// Identifiers are unique within a sample. Splitting and perturbation build
/// new samples out of existing records and never mint identifiers.
/// Deserialization goes through [`Sample::try_new`] and rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Record>", into = "Vec<Record>")]
pub struct Sample {
    records: Vec<Record>,
}

/// Two records of one sample share an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("duplicate row identifier {id}")]
pub struct DuplicateRowIdError {
    id: RowId,
}

impl DuplicateRowIdError {
    #[must_use]
    pub fn id(&self) -> RowId {
        self.id
    }
}

impl Sample {
    /// Wraps records into a sample.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if identifiers are not unique.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        debug_assert!(
            first_duplicate(&records).is_none(),
            "row identifiers must be unique"
        );
        Self { records }
    }

    /// Wraps records into a sample, checking identifier uniqueness.
    pub fn try_new(records: Vec<Record>) -> Result<Self, DuplicateRowIdError> {
        match first_duplicate(&records) {
            Some(id) => Err(DuplicateRowIdError { id }),
            None => Ok(Self { records }),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn features(&self) -> impl Iterator<Item = Features> + '_ {
        self.records.iter().map(|r| r.features)
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.records.iter().map(|r| r.label)
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    /// Number of records per class, indexed by [`Label::index`].
    #[must_use]
    pub fn class_counts(&self) -> [usize; Label::LEN] {
        let mut counts = [0; Label::LEN];
        for record in &self.records {
            counts[record.label.index()] += 1;
        }
        counts
    }

    /// Proportion of records labeled [`Label::One`], or `None` for an empty sample.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn class1_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.class_counts()[Label::One.index()] as f64 / self.len() as f64)
    }

    /// Records of one class, in sample order.
    pub fn records_of(&self, label: Label) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().filter(move |r| r.label == label)
    }
}

impl TryFrom<Vec<Record>> for Sample {
    type Error = DuplicateRowIdError;

    fn try_from(records: Vec<Record>) -> Result<Self, Self::Error> {
        Self::try_new(records)
    }
}

impl From<Sample> for Vec<Record> {
    fn from(sample: Sample) -> Self {
        sample.records
    }
}

fn first_duplicate(records: &[Record]) -> Option<RowId> {
    let mut ids = records.iter().map(|r| r.id).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

impl FromIterator<Record> for Sample {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
