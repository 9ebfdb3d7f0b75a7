//! Read-only catalog of historical milestones and component variants.

mod model;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bevy::log::info;

use crate::error::{ExplorerError, Result};
use crate::timeline::validate_points;

pub use model::{
    CatalogRecord, Category, Comparison, DeviceKind, Era, Filter, Side, TimePoint,
};
use model::CatalogFile;

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.json");

/// Immutable record store. Insertion order is display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<Arc<CatalogRecord>>,
    index: HashMap<String, usize>,
    timeline: Vec<TimePoint>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ExplorerError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        info!(
            "loaded {} catalog records from {}",
            catalog.records.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_parts(file.records, file.timeline)
    }

    /// Validate and index records. Ids must be unique, milestones need a
    /// device kind and components must not carry one.
    pub fn from_parts(records: Vec<CatalogRecord>, timeline: Vec<TimePoint>) -> Result<Self> {
        validate_points(&timeline)?;

        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            validate_record(record)?;
            if index.insert(record.id.clone(), position).is_some() {
                return Err(ExplorerError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self {
            records: records.into_iter().map(Arc::new).collect(),
            index,
            timeline,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all(&self) -> &[Arc<CatalogRecord>] {
        &self.records
    }

    pub fn timeline_points(&self) -> &[TimePoint] {
        &self.timeline
    }

    pub fn by_category(&self, category: Category) -> Vec<Arc<CatalogRecord>> {
        self.matching(|r| r.category == category)
    }

    pub fn by_id(&self, id: &str) -> Option<Arc<CatalogRecord>> {
        self.index.get(id).map(|&i| Arc::clone(&self.records[i]))
    }

    pub fn by_era(&self, era: Era) -> Vec<Arc<CatalogRecord>> {
        self.matching(|r| r.era == era)
    }

    /// Records selected by a scene group filter, in catalog order.
    pub fn select(&self, filter: Filter) -> Vec<Arc<CatalogRecord>> {
        match filter {
            Filter::All => self.records.clone(),
            Filter::Category(category) => self.by_category(category),
            Filter::Era(era) => self.by_era(era),
        }
    }

    /// Distinct eras in first-seen order.
    pub fn eras(&self) -> Vec<Era> {
        let mut eras = Vec::new();
        for record in &self.records {
            if !eras.contains(&record.era) {
                eras.push(record.era);
            }
        }
        eras
    }

    /// Case-insensitive match over title, description, era and key figures.
    pub fn search(&self, keyword: &str) -> Vec<Arc<CatalogRecord>> {
        let needle = keyword.to_lowercase();
        self.matching(|r| {
            r.title.to_lowercase().contains(&needle)
                || r.description.to_lowercase().contains(&needle)
                || r.era.label().contains(&needle)
                || r
                    .key_figures
                    .iter()
                    .any(|figure| figure.to_lowercase().contains(&needle))
        })
    }

    /// Records whose numeric year lies in `start..=end`. Unparseable years are skipped.
    pub fn by_year_range(&self, start: i32, end: i32) -> Vec<Arc<CatalogRecord>> {
        self.matching(|r| {
            r.numeric_year()
                .is_some_and(|year| (start..=end).contains(&year))
        })
    }

    /// Compare two records by era: newer is faster, older is larger,
    /// hungrier and costlier.
    pub fn compare(&self, first: &str, second: &str) -> Option<Comparison> {
        let a = self.by_id(first)?;
        let b = self.by_id(second)?;
        let newer = match a.era.cmp(&b.era) {
            std::cmp::Ordering::Less => Side::Second,
            std::cmp::Ordering::Greater => Side::First,
            std::cmp::Ordering::Equal => Side::Even,
        };
        let older = match newer {
            Side::First => Side::Second,
            Side::Second => Side::First,
            Side::Even => Side::Even,
        };
        Some(Comparison {
            faster: newer,
            larger: older,
            hungrier: older,
            costlier: older,
        })
    }

    fn matching(&self, pred: impl Fn(&CatalogRecord) -> bool) -> Vec<Arc<CatalogRecord>> {
        self.records
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }
}

fn validate_record(record: &CatalogRecord) -> Result<()> {
    let invalid = |reason: &str| ExplorerError::InvalidRecord {
        id: record.id.clone(),
        reason: reason.to_string(),
    };
    if record.id.is_empty() {
        return Err(invalid("empty id"));
    }
    if record.title.trim().is_empty() {
        return Err(invalid("empty title"));
    }
    match (record.category.is_component(), record.device) {
        (false, None) => Err(invalid("milestone without a device kind")),
        (true, Some(_)) => Err(invalid("component with a device kind")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn builtin_catalog_has_every_shelf() {
        let catalog = builtin();
        assert_eq!(catalog.by_category(Category::HistoricalNode).len(), 11);
        assert_eq!(catalog.by_category(Category::Cpu).len(), 5);
        assert_eq!(catalog.by_category(Category::Memory).len(), 5);
        assert_eq!(catalog.by_category(Category::Storage).len(), 5);
        assert_eq!(catalog.timeline_points().len(), 11);
    }

    #[test]
    fn by_category_keeps_catalog_order() {
        let ids: Vec<_> = builtin()
            .by_category(Category::Cpu)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(
            ids,
            [
                "vacuum-tube-cpu",
                "transistor-cpu",
                "ic-cpu",
                "microprocessor-cpu",
                "modern-cpu"
            ]
        );
    }

    #[test]
    fn by_id_finds_and_misses() {
        let catalog = builtin();
        let eniac = catalog.by_id("eniac").unwrap();
        assert_eq!(eniac.era, Era::Electronic);
        assert_eq!(eniac.device, Some(DeviceKind::Electronic));
        assert_eq!(eniac.spec("Weight"), Some("30 t"));
        assert!(catalog.by_id("difference-engine-2").is_none());
    }

    #[test]
    fn by_era_spans_categories() {
        let modern = builtin().by_era(Era::Modern);
        assert_eq!(modern.len(), 4);
        assert!(modern.iter().any(|r| r.category == Category::HistoricalNode));
        assert!(modern.iter().any(|r| r.category == Category::Storage));
    }

    #[test]
    fn search_is_case_insensitive_and_covers_key_figures() {
        let catalog = builtin();
        let hits = catalog.search("LOVELACE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "analytical-engine");
        assert!(catalog.search("zzz-not-present").is_empty());
    }

    #[test]
    fn year_range_handles_bc_labels() {
        let catalog = builtin();
        let ancient = catalog.by_year_range(-3000, 0);
        assert_eq!(ancient.len(), 1);
        assert_eq!(ancient[0].id, "abacus");

        let forties: Vec<_> = catalog
            .by_year_range(1940, 1949)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert!(forties.contains(&"eniac".to_string()));
        assert!(forties.contains(&"transistor-computer".to_string()));
    }

    #[test]
    fn eras_are_distinct_in_first_seen_order() {
        let eras = builtin().eras();
        assert_eq!(eras.first(), Some(&Era::Ancient));
        let distinct: std::collections::HashSet<_> = eras.iter().collect();
        assert_eq!(distinct.len(), eras.len());
    }

    #[test]
    fn compare_uses_era_order() {
        let catalog = builtin();
        let cmp = catalog.compare("vacuum-tube-cpu", "modern-cpu").unwrap();
        assert_eq!(cmp.faster, Side::Second);
        assert_eq!(cmp.larger, Side::First);
        assert_eq!(cmp.costlier, Side::First);

        let even = catalog.compare("hard-disk", "optical-storage").unwrap();
        assert_eq!(even.faster, Side::Even);
        assert!(catalog.compare("hard-disk", "nope").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let catalog = builtin();
        let mut records: Vec<CatalogRecord> =
            catalog.all().iter().map(|r| (**r).clone()).collect();
        records.push(records[0].clone());
        let err = Catalog::from_parts(records, catalog.timeline_points().to_vec()).unwrap_err();
        assert!(matches!(err, ExplorerError::DuplicateId(id) if id == "abacus"));
    }

    #[test]
    fn milestone_without_device_is_rejected() {
        let catalog = builtin();
        let mut record = (*catalog.by_id("eniac").unwrap()).clone();
        record.device = None;
        let err = Catalog::from_parts(vec![record], catalog.timeline_points().to_vec())
            .unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidRecord { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Catalog::from_json("{ \"records\": 3 }").unwrap_err();
        assert!(matches!(err, ExplorerError::CatalogParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Catalog::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ExplorerError::CatalogIo { .. }));
    }
}
