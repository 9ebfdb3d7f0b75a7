use serde::{Deserialize, Serialize};

/// Which shelf a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    HistoricalNode,
    Cpu,
    Memory,
    Storage,
}

impl Category {
    pub const COMPONENTS: [Category; 3] = [Category::Cpu, Category::Memory, Category::Storage];

    pub fn is_component(self) -> bool {
        !matches!(self, Category::HistoricalNode)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::HistoricalNode => "Milestone",
            Category::Cpu => "CPU",
            Category::Memory => "Memory",
            Category::Storage => "Storage",
        }
    }
}

/// Technology era, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Era {
    Ancient,
    Mechanical,
    Early,
    Electronic,
    Transistor,
    Integrated,
    Digital,
    Modern,
}

impl Era {
    pub fn label(self) -> &'static str {
        match self {
            Era::Ancient => "ancient",
            Era::Mechanical => "mechanical",
            Era::Early => "early",
            Era::Electronic => "electronic",
            Era::Transistor => "transistor",
            Era::Integrated => "integrated",
            Era::Digital => "digital",
            Era::Modern => "modern",
        }
    }
}

/// Kind of machine a historical milestone shows. Drives its silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    Abacus,
    Mechanical,
    Analytical,
    Electronic,
    Transistor,
    Integrated,
    Microprocessor,
    Personal,
    Internet,
    Modern,
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub category: Category,
    pub era: Era,
    pub display_year: String,
    pub title: String,
    pub description: String,
    /// Ordered `[label, value]` pairs.
    #[serde(default)]
    pub specs: Vec<(String, String)>,
    #[serde(default)]
    pub advantages: Vec<String>,
    #[serde(default)]
    pub disadvantages: Vec<String>,
    #[serde(default)]
    pub impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
    #[serde(default)]
    pub key_figures: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceKind>,
}

impl CatalogRecord {
    /// Numeric year parsed from the display label. A `BC` suffix yields a negative year.
    pub fn numeric_year(&self) -> Option<i32> {
        parse_year(&self.display_year)
    }

    pub fn spec(&self, label: &str) -> Option<&str> {
        self.specs
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }
}

pub(crate) fn parse_year(label: &str) -> Option<i32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let year: i32 = digits.parse().ok()?;
    if label.to_ascii_uppercase().contains("BC") {
        Some(-year)
    } else {
        Some(year)
    }
}

/// Named stop on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub threshold: f32,
    pub label: String,
    pub year: String,
}

/// Which slice of the catalog a scene group shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Category(Category),
    Era(Era),
}

/// Which of two records wins a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
    Even,
}

/// Era-based verdicts between two records.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub faster: Side,
    pub larger: Side,
    pub hungrier: Side,
    pub costlier: Side,
}

/// Serialized catalog layout.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogFile {
    pub timeline: Vec<TimePoint>,
    pub records: Vec<CatalogRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_bc_years() {
        assert_eq!(parse_year("1642"), Some(1642));
        assert_eq!(parse_year("2700 BC"), Some(-2700));
        assert_eq!(parse_year("circa 1890s"), Some(1890));
        assert_eq!(parse_year("unknown"), None);
    }

    #[test]
    fn eras_are_ordered_oldest_first() {
        assert!(Era::Ancient < Era::Mechanical);
        assert!(Era::Early < Era::Electronic);
        assert!(Era::Digital < Era::Modern);
    }

    #[test]
    fn category_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&Category::HistoricalNode).unwrap();
        assert_eq!(json, "\"historical-node\"");
        let back: Category = serde_json::from_str("\"cpu\"").unwrap();
        assert_eq!(back, Category::Cpu);
    }
}
