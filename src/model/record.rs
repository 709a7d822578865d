/// One parsed line of a score file.
///
/// `entity_id` is the first column: the morph ID in morph score files, the
/// subject ID in distribution files. `counterpart_id` is the second column.
/// Scores keep file order, which is probe order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    entity_id: String,
    counterpart_id: String,
    scores: Vec<f64>,
}

impl ScoreRecord {
    /// Returns `None` when `scores` is empty.
    pub fn new(
        entity_id: impl Into<String>,
        counterpart_id: impl Into<String>,
        scores: Vec<f64>,
    ) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        Some(Self {
            entity_id: entity_id.into(),
            counterpart_id: counterpart_id.into(),
            scores,
        })
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn counterpart_id(&self) -> &str {
        &self.counterpart_id
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }
}
