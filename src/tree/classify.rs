use super::{GroupTree, NodeId};
use crate::record::FieldLookup;
use rayon::prelude::*;
use tracing::debug;

impl GroupTree {
    /// Records whose composite result at `id` is true, in input order.
    pub fn filter_records<'a, R>(&self, id: NodeId, records: &'a [R]) -> Vec<&'a R>
    where
        R: FieldLookup + Sync,
    {
        if self.node(id).is_none() {
            return Vec::new();
        }
        records
            .par_iter()
            .filter(|record| self.node_matches(id, *record))
            .collect()
    }

    /// Records matched by at least one root, in input order.
    pub fn select<'a, R>(&self, records: &'a [R]) -> Vec<&'a R>
    where
        R: FieldLookup + Sync,
    {
        records
            .par_iter()
            .filter(|record| {
                self.roots
                    .iter()
                    .any(|root| self.node_matches(*root, *record))
            })
            .collect()
    }

    /// Group membership for each record, computed in parallel.
    ///
    /// `result[i]` equals `self.matching_groups(&records[i])`.
    pub fn classify_all<R>(&self, records: &[R]) -> Vec<Vec<NodeId>>
    where
        R: FieldLookup + Sync,
    {
        debug!(records = records.len(), groups = self.len(), "batch classification");
        records
            .par_iter()
            .map(|record| self.matching_groups(record))
            .collect()
    }
}
