use crate::{
    centers::CenterTables, pairing::PairingTables, start, success,
    three_by_three::ThreeByThreeTables,
};
use log::info;
use std::time::Instant;

/// Every table the solver reads. Built once, then shared read-only.
#[derive(Debug)]
pub struct Tables {
    pub centers: CenterTables,
    pub pairing: PairingTables,
    pub three_by_three: ThreeByThreeTables,
}

impl Tables {
    #[must_use]
    pub fn new() -> Self {
        info!(start!("Building solver tables"));
        let start = Instant::now();
        let tables = Self {
            centers: CenterTables::new(),
            pairing: PairingTables::new(),
            three_by_three: ThreeByThreeTables::new(),
        };
        info!(
            success!("Built solver tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        tables
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}
