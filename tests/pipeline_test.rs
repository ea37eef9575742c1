use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use crime_lens::data::geo::GeoPoints;
use crime_lens::data::model::AgeGroup;
use crime_lens::{
    load_dataset, recompute, DashboardConfig, DashboardError, DataLoadError, FilterParams, Session,
};
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

const HEADER: &str = "dr_no,division_number,date_reported,date_occurred,area,area_name,\
crime_code,victim_age,victim_sex,victim_descent,weapon_code,weapon_description,\
status,cross_street,latitude,longitude";

const AREAS: [&str; 5] = ["Central", "Rampart", "Southwest", "Hollenbeck", "Harbor"];
const WEAPONS: [&str; 3] = ["HAND GUN", "KNIFE", "VERBAL THREAT"];

fn write_csv(header: &str, rows: &[String]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{header}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// 100 rows, 20 per area, months cycling through the year.
fn hundred_rows() -> Vec<String> {
    (0..100)
        .map(|i| {
            let area = AREAS[i % 5];
            let weapon = WEAPONS[i % 3];
            let month = i % 12 + 1;
            let age = 5 + (i * 7) % 80;
            format!(
                "{},{},2021-{month:02}-20T00:00:00,2021-{month:02}-18T14:30:00,{},{area},\
                 624,{age},{},H,400,{weapon},IC,,{},{}",
                1000 + i,
                i % 21,
                i % 5 + 1,
                if i % 2 == 0 { "M" } else { "F" },
                34.0 + (i % 5) as f64 * 0.05,
                -118.3 + (i % 5) as f64 * 0.05,
            )
        })
        .collect()
}

fn session_for(path: &Path) -> Session {
    let config = DashboardConfig::default();
    let dataset = load_dataset(path, &config).unwrap();
    Session::new(dataset, config)
}

#[test]
fn five_equal_areas_give_five_equal_counts() {
    let file = write_csv(HEADER, &hundred_rows());
    let session = session_for(file.path());
    let result = session.result();

    assert_eq!(result.filtered_count, 100);
    assert_eq!(result.by_area.len(), 5);
    for entry in &result.by_area {
        assert_eq!(entry.count, 20, "{}", entry.key);
    }
    let total: usize = result.by_area.iter().map(|c| c.count).sum();
    assert_eq!(total, result.filtered_count);
}

#[test]
fn configured_columns_are_dropped() {
    let file = write_csv(HEADER, &hundred_rows());
    let session = session_for(file.path());

    for dropped in ["division_number", "area", "crime_code", "weapon_code", "status"] {
        assert!(session.report.dropped_columns.iter().any(|c| c == dropped));
        assert!(!session.table.numeric_columns.iter().any(|c| c == dropped));
    }
    assert_eq!(
        session.table.numeric_columns,
        vec!["dr_no", "victim_age", "latitude", "longitude", "month", "year"]
    );
}

#[test]
fn null_age_counts_everywhere_but_age_groups() {
    let rows = vec![
        "1,1,2021-03-02,2021-03-01,1,Central,624,,M,H,400,KNIFE,IC,,34.0,-118.2".to_string(),
        "2,1,2021-03-02,2021-03-01,1,Central,624,30,F,H,400,KNIFE,IC,,34.0,-118.2".to_string(),
    ];
    let file = write_csv(HEADER, &rows);
    let session = session_for(file.path());
    let result = session.result();

    assert_eq!(result.filtered_count, 2);
    assert_eq!(result.by_area[0].count, 2);
    assert_eq!(result.trend[0].count, 2);
    assert_eq!(result.by_age_group.len(), 1);
    assert_eq!(result.by_age_group[0].key, AgeGroup::YoungAdult);
    assert_eq!(result.by_age_group[0].count, 1);
}

#[test]
fn empty_weapon_selection_empties_every_aggregate() {
    let file = write_csv(HEADER, &hundred_rows());
    let mut session = session_for(file.path());
    let mut params = session.params.clone();
    params.weapons.clear();
    let result = session.set_params(params);

    assert_eq!(result.filtered_count, 0);
    assert!(result.trend.is_empty());
    assert!(result.by_area.is_empty());
    assert!(result.by_age_group.is_empty());
    assert!(result.by_weapon.is_empty());
    assert!(result.correlation.is_none());
    assert_eq!(result.points, GeoPoints::Available(Vec::new()));
    assert!(result.frequency_map.is_none());
}

#[test]
fn filtered_rows_stay_within_selection() {
    let file = write_csv(HEADER, &hundred_rows());
    let session = session_for(file.path());

    let mut params = FilterParams::select_all(&session.table);
    params.months = [1, 2, 3].into_iter().collect();
    params.areas = ["Central".to_string(), "Harbor".to_string()].into_iter().collect();
    params.age_groups = [AgeGroup::YoungAdult, AgeGroup::Adult].into_iter().collect();
    params.weapons = ["KNIFE".to_string()].into_iter().collect();

    let view = crime_lens::data::filter::filter_incidents(&session.table.incidents, &params);
    assert!(!view.is_empty());
    for inc in &view {
        assert!(params.months.contains(&inc.month));
        assert!(params.areas.contains(inc.area_name.as_ref().unwrap()));
        assert!(params.age_groups.contains(&inc.age_group.unwrap()));
        assert!(params.weapons.contains(&inc.weapon_description));
    }

    let again = crime_lens::data::filter::filter_incidents(view.iter().copied(), &params);
    assert_eq!(view, again);

    let result = recompute(&session.table, &params, &session.config);
    assert_eq!(result.filtered_count, view.len());
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let file = write_csv(HEADER, &hundred_rows());
    let session = session_for(file.path());
    let matrix = session.result().correlation.as_ref().unwrap();

    let n = matrix.columns.len();
    for i in 0..n {
        assert_eq!(matrix.get(i, i), 1.0);
        for j in 0..n {
            let (a, b) = (matrix.get(i, j), matrix.get(j, i));
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }
}

#[test]
fn frequency_map_is_recomputed_per_filter() {
    let file = write_csv(HEADER, &hundred_rows());
    let mut session = session_for(file.path());

    let map = session.result().frequency_map.clone().unwrap();
    assert_eq!(map.markers.len(), 5);
    // All areas tie, so every one is at the top threshold.
    assert!(map
        .markers
        .iter()
        .all(|m| m.frequency == crime_lens::data::geo::CrimeFrequency::High));

    let mut params = session.params.clone();
    params.areas.remove("Harbor");
    params.months = (1..=6).collect();
    let map = session.set_params(params).frequency_map.clone().unwrap();
    assert_eq!(map.markers.len(), 4);
    for a in &map.markers {
        for b in &map.markers {
            if a.count > b.count {
                assert!(a.frequency >= b.frequency);
            }
        }
    }
}

#[test]
fn missing_coordinates_degrade_gracefully() {
    let header = "date_reported,date_occurred,area_name,victim_age,victim_sex,weapon_description";
    let rows = vec!["2021-03-02,2021-03-01,Central,40,M,KNIFE".to_string()];
    let file = write_csv(header, &rows);
    let session = session_for(file.path());
    let result = session.result();

    assert_eq!(result.filtered_count, 1);
    assert_eq!(result.points, GeoPoints::Unavailable);
    assert!(result.frequency_map.is_none());
}

#[test]
fn area_and_weapon_labels_survive_loading() {
    let rows = vec![
        "1,1,2021-03-02,2021-03-01,1,Inf,624,30,F,H,400,007,IC,,34.0,-118.2".to_string(),
        "2,1,2021-03-02,2021-03-01,1,Central,624,40,M,H,400,KNIFE,IC,,34.1,-118.3".to_string(),
    ];
    let file = write_csv(HEADER, &rows);
    let session = session_for(file.path());

    assert_eq!(session.table.areas, vec!["Inf", "Central"]);
    assert!(session.table.top_weapons.iter().any(|w| w == "007"));
    let first = &session.table.incidents[0];
    assert_eq!(first.area_name.as_deref(), Some("Inf"));
    assert_eq!(first.weapon_description, "007");
}

#[test]
fn na_sex_rows_are_removed() {
    let rows = vec![
        "1,1,2021-03-02,2021-03-01,1,Central,624,30,NA,H,400,KNIFE,IC,,34.0,-118.2".to_string(),
        "2,1,2021-03-02,2021-03-01,1,Central,624,40,M,H,400,KNIFE,IC,,34.1,-118.3".to_string(),
    ];
    let file = write_csv(HEADER, &rows);
    let session = session_for(file.path());

    assert_eq!(session.report.rows_missing_required, 1);
    assert_eq!(session.result().filtered_count, 1);
}

#[test]
fn missing_required_column_is_reported() {
    let header = "date_reported,date_occurred,area_name,victim_sex,weapon_description";
    let rows = vec!["2021-03-02,2021-03-01,Central,M,KNIFE".to_string()];
    let file = write_csv(header, &rows);

    let err = load_dataset(file.path(), &DashboardConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::DataLoad(DataLoadError::MissingColumn(c)) if c == "victim_age"
    ));
}

#[test]
fn missing_file_is_fatal() {
    let err = load_dataset(Path::new("/no/such/incidents.csv"), &DashboardConfig::default())
        .unwrap_err();
    assert!(matches!(err, DashboardError::DataLoad(DataLoadError::Io { .. })));
}

#[test]
fn parquet_input_matches_csv_semantics() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("date_reported", DataType::Utf8, true),
        Field::new("date_occurred", DataType::Utf8, true),
        Field::new("area_name", DataType::Utf8, true),
        Field::new("victim_age", DataType::Int64, true),
        Field::new("victim_sex", DataType::Utf8, true),
        Field::new("weapon_description", DataType::Utf8, true),
        Field::new("latitude", DataType::Float64, true),
        Field::new("longitude", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["2022-05-02", "2022-06-02", "2022-06-03"])),
        Arc::new(StringArray::from(vec!["2022-05-01", "2022-06-01", "2022-06-01"])),
        Arc::new(StringArray::from(vec!["Central", "Harbor", "Harbor"])),
        Arc::new(Int64Array::from(vec![Some(25), None, Some(60)])),
        Arc::new(StringArray::from(vec![Some("F"), Some("M"), None])),
        Arc::new(StringArray::from(vec!["KNIFE", "KNIFE", "KNIFE"])),
        Arc::new(Float64Array::from(vec![34.0, 33.7, 33.8])),
        Arc::new(Float64Array::from(vec![-118.2, -118.3, -118.3])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let out = std::fs::File::create(file.path()).unwrap();
    let mut writer = ArrowWriter::try_new(out, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let session = session_for(file.path());
    let result = session.result();
    assert_eq!(session.report.rows_missing_required, 1);
    assert_eq!(result.filtered_count, 2);
    assert_eq!(result.trend.len(), 2);
    assert_eq!(result.by_age_group.len(), 1);
    assert!(matches!(&result.points, GeoPoints::Available(p) if p.len() == 2));
}
