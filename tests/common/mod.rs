// Shared fixtures for surveydash integration tests
#![allow(dead_code)]

use indoc::indoc;
use std::fs;
use std::path::{Path, PathBuf};
use surveydash::core::{GeoLevel, ResponseRecord, SurveyVariant};

pub const DASHBOARD_TOML: &str = indoc! {r#"
    title = "Community survey"

    [tables.labels.GENDER]
    1 = "Male"
    2 = "Female"

    [tables.labels.PRIORITY1]
    1 = "Parks"
    2 = "Roads"
    3 = "Schools"

    [tables.zips]
    94110 = "9"
    94103 = "6"

    [[tables.geo.area]]
    code = "3"
    label = "North"

    [[tables.geo.area]]
    code = "30"
    label = "Harbor"

    [[charts]]
    id = "gender"
    shape = { type = "categorical", field = "GENDER" }
    presentation = { kind = "pie", title = "Gender" }

    [[charts]]
    id = "age"
    presentation = { kind = "bar", title = "Age" }

    [charts.shape]
    type = "buckets"
    field = "AGE"
    buckets = [
        { label = "18-34", min = 18, max = 34 },
        { label = "35-64", min = 35, max = 64 },
        { label = "65+", min = 65, max = 120 },
    ]

    [[charts]]
    id = "transport"
    presentation = { kind = "bar", title = "Transport used" }

    [charts.shape]
    type = "multi_select"
    options = [
        { field = "TRANSPORT_BUS", label = "Bus" },
        { field = "TRANSPORT_BIKE", label = "Bike" },
        { field = "TRANSPORT_CAR", label = "Car" },
    ]

    [[charts]]
    id = "priorities"
    shape = { type = "priority", first = "PRIORITY1", second = "PRIORITY2" }
    presentation = { kind = "stacked_bar", title = "Top priorities" }

    [[charts]]
    id = "priorities_by_area"
    presentation = { kind = "map", title = "Top priority by area" }

    [charts.shape]
    type = "geo_crosstab"
    level = "area"
    inner = { type = "categorical", field = "PRIORITY1" }

    [[charts]]
    id = "satisfaction"
    shape = { type = "mean", field = "SATISFACTION", min = 1, max = 5 }
    presentation = { kind = "gauge", title = "Satisfaction" }
"#};

pub fn record(id: &str) -> ResponseRecord {
    ResponseRecord::new(id)
}

/// Ten respondents across two areas and both instruments.
pub fn sample_records() -> Vec<ResponseRecord> {
    let rows: [(&str, &str, f64, &str, &str, &str, f64, SurveyVariant); 10] = [
        ("r1", "1", 22.0, "3", "1", "2", 4.0, SurveyVariant::Formal),
        ("r2", "1", 35.0, "3", "1", "3", 5.0, SurveyVariant::Formal),
        ("r3", "2", 41.0, "3", "2", "1", 3.0, SurveyVariant::Formal),
        ("r4", "2", 67.0, "30", "3", "1", 2.0, SurveyVariant::Formal),
        ("r5", "1", 29.0, "30", "3", "2", 4.0, SurveyVariant::Formal),
        ("r6", "2", 55.0, "30", "1", "", 9.0, SurveyVariant::Public),
        ("r7", "", 19.0, "3", "2", "3", 1.0, SurveyVariant::Public),
        ("r8", "1", 70.0, "3", "", "", 5.0, SurveyVariant::Public),
        ("r9", "2", 33.0, "30", "1", "2", 3.0, SurveyVariant::Public),
        ("r10", "1", 48.0, "3", "2", "1", 4.0, SurveyVariant::Public),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (id, gender, age, area, p1, p2, sat, variant))| {
            let mut r = record(id)
                .with_answer("GENDER", *gender)
                .with_answer("AGE", *age)
                .with_answer("PRIORITY1", *p1)
                .with_answer("PRIORITY2", *p2)
                .with_answer("SATISFACTION", *sat)
                .with_geo(GeoLevel::Area, *area)
                .with_geo(GeoLevel::District, if *area == "3" { "9" } else { "6" })
                .with_instrument(*variant);
            // First six respondents ticked at least one transport option.
            if i < 6 {
                r = r.with_answer("TRANSPORT_BUS", i % 2 == 0);
                r = r.with_answer("TRANSPORT_BIKE", i % 3 == 0);
                r = r.with_answer("TRANSPORT_CAR", i % 2 == 1);
            }
            r
        })
        .collect()
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_records(&self, records: &[ResponseRecord]) -> PathBuf {
        self.write(
            "responses.json",
            &serde_json::to_string_pretty(records).unwrap(),
        )
    }

    pub fn write_dashboard(&self) -> PathBuf {
        self.write("dashboard.toml", DASHBOARD_TOML)
    }
}
