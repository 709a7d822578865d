use std::collections::BTreeMap;

use crate::model::morph::MorphEntry;
use crate::model::record::ScoreRecord;

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub morphs: BTreeMap<String, MorphEntry>,
    pub n_records: usize,
    pub n_probes: usize,
    pub min_probes: Option<usize>,
    pub max_probes: Option<usize>,
}

/// Groups morph score records by morph ID. Ragged probe counts are kept as is.
pub fn run_stage1(records: &[ScoreRecord]) -> Stage1Output {
    let morphs = aggregate_morphs(records);

    let mut n_probes = 0usize;
    let mut min_probes: Option<usize> = None;
    let mut max_probes: Option<usize> = None;
    for entry in morphs.values() {
        let n = entry.n_probes();
        n_probes += n;
        min_probes = Some(min_probes.map_or(n, |m| m.min(n)));
        max_probes = Some(max_probes.map_or(n, |m| m.max(n)));
    }

    if let (Some(lo), Some(hi)) = (min_probes, max_probes) {
        if lo != hi {
            tracing::info!(
                min_probes = lo,
                max_probes = hi,
                "morphs have unequal probe counts; using every available probe score"
            );
        }
    }
    tracing::info!(
        morphs = morphs.len(),
        probes = n_probes,
        "aggregated morph entries"
    );

    Stage1Output {
        morphs,
        n_records: records.len(),
        n_probes,
        min_probes,
        max_probes,
    }
}

pub fn aggregate_morphs(records: &[ScoreRecord]) -> BTreeMap<String, MorphEntry> {
    let mut morphs: BTreeMap<String, MorphEntry> = BTreeMap::new();
    for record in records {
        let entry = morphs
            .entry(record.entity_id().to_string())
            .or_insert_with(|| MorphEntry::new(record.entity_id()));
        if entry.subjects.contains(record.counterpart_id()) {
            tracing::debug!(
                morph = record.entity_id(),
                subject = record.counterpart_id(),
                "repeated morph/subject pair; appending probe scores"
            );
        }
        entry.push_scores(record.counterpart_id(), record.scores());
    }
    morphs
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_aggregate.rs"]
mod tests;
