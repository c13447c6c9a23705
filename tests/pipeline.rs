use std::fs;
use std::path::Path;

use arrow::array::AsArray;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use geonames_cities::warehouse::{LocalWarehouse, TableRef, CATALOG_FILE, PART_FILE};
use geonames_cities::{extract, run, FailureKind, FailureReport, RunError, RunOptions, Sources};

const COUNTRY_INFO: &str = "\
#ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital
US\tUSA\t840\tUS\tUnited States\tWashington
CA\tCAN\t124\tCA\tCanada\tOttawa
AU\tAUS\t036\tAS\tAustralia\tCanberra
";

fn city_line(
    id: u32,
    name: &str,
    lat: &str,
    lon: &str,
    code: &str,
    cc: &str,
    admin1: &str,
) -> String {
    let id = id.to_string();
    [
        id.as_str(), name, name, "", lat, lon, "P", code, cc, "", admin1, "", "", "", "5000", "",
        "100", "Etc/UTC", "2024-01-01",
    ]
    .join("\t")
}

fn write_sources(dir: &Path) -> Sources {
    let cities = [
        city_line(1, "Washington", "38.90", "-77.04", "PPLC", "US", "DC"),
        city_line(2, "Springfield", "39.80", "-89.64", "PPLA", "US", "IL"),
        city_line(3, "Smalltown", "40.00", "-89.00", "PPL", "US", "IL"),
        city_line(4, "Toronto", "43.70", "-79.42", "PPLA", "CA", "08"),
        city_line(5, "Hobart", "-42.88", "147.33", "PPLA", "AU", "06"),
        city_line(6, "Reykjavik", "64.14", "-21.90", "PPLC", "IS", "39"),
        city_line(7, "Ruins", "30.00", "30.00", "PPLH", "EG", "01"),
    ]
    .join("\n");

    let sources = Sources {
        cities: dir.join("cities1000.txt"),
        countries: dir.join("countryInfo.txt"),
    };
    fs::write(&sources.cities, cities).unwrap();
    fs::write(&sources.countries, COUNTRY_INFO).unwrap();
    sources
}

fn options(partition: &str, min_rows: usize) -> RunOptions {
    RunOptions {
        table: TableRef::new("fan_search", "geonames_cities1000"),
        partition: partition.to_string(),
        min_rows,
    }
}

#[test]
fn extract_applies_all_rules() {
    let dir = tempfile::tempdir().unwrap();
    let sources = write_sources(dir.path());
    let scan = extract(&sources).unwrap();

    assert_eq!(scan.lines, 7);
    assert_eq!(scan.discarded, 2);

    let summary: Vec<(&str, &str, &str, &str)> = scan
        .rows
        .iter()
        .map(|r| {
            (
                r.name.as_str(),
                r.admin1.as_str(),
                r.admin2.as_str(),
                r.cc.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [
            ("Washington", "DC", "United States", "US"),
            ("Springfield", "IL", "United States", "US"),
            ("Toronto", "ON", "Canada", "CA"),
            ("Hobart", "TAS", "Australia", "AU"),
            ("Reykjavik", "39", "", "IS"),
        ]
    );
    assert_eq!(scan.rows[0].lat, 38.90);
    assert_eq!(scan.rows[0].lon, -77.04);
}

#[test]
fn run_publishes_partition() {
    let dir = tempfile::tempdir().unwrap();
    let sources = write_sources(dir.path());
    let root = dir.path().join("warehouse");
    let mut store = LocalWarehouse::open(&root).unwrap();

    let summary = run(&sources, &mut store, &options("2024010100", 4)).unwrap();
    assert_eq!(summary.emitted.rows, 5);
    assert_eq!(summary.discarded, 2);

    let table = TableRef::new("fan_search", "geonames_cities1000");
    let part_dir = store.partition_dir(&table, "2024010100");
    assert_eq!(
        store.table_location(&table),
        Some(part_dir.display().to_string().as_str())
    );

    let file = fs::File::open(part_dir.join(PART_FILE)).unwrap();
    let batches: Vec<_> = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 5);
    let admin1 = batches[0].column(3).as_string::<i32>();
    assert_eq!(admin1.value(2), "ON");

    // a second day repoints the table, the first partition stays on disk
    run(&sources, &mut store, &options("2024010200", 4)).unwrap();
    let reopened = LocalWarehouse::open(&root).unwrap();
    assert_eq!(
        reopened.table_location(&table),
        Some(
            reopened
                .partition_dir(&table, "2024010200")
                .display()
                .to_string()
                .as_str()
        )
    );
    assert!(part_dir.join(PART_FILE).is_file());
}

#[test]
fn run_rejects_batch_at_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let sources = write_sources(dir.path());
    let root = dir.path().join("warehouse");
    let mut store = LocalWarehouse::open(&root).unwrap();

    let err = run(&sources, &mut store, &options("2024010100", 5)).unwrap_err();
    assert!(matches!(err, RunError::Validation(_)));
    assert_eq!(FailureReport::from(&err), FailureReport::data_error(5));

    // nothing was registered or written
    assert!(!root.join(CATALOG_FILE).exists());
    assert!(store.catalog().namespaces.is_empty());
}

#[test]
fn run_reports_parse_failures_as_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let sources = write_sources(dir.path());
    fs::write(
        &sources.cities,
        city_line(1, "Nowhere", "ninety", "0.0", "PPLC", "US", "DC"),
    )
    .unwrap();
    let mut store = LocalWarehouse::open(dir.path().join("warehouse")).unwrap();

    let err = run(&sources, &mut store, &options("2024010100", 0)).unwrap_err();
    let report = FailureReport::from(&err);
    assert_eq!(report.kind, FailureKind::LoadError);
    assert!(report.rows.is_none());
    let detail = report.error.unwrap();
    assert!(detail.contains("malformed line 1"), "{detail}");
    assert!(detail.contains("invalid latitude \"ninety\""), "{detail}");
}

#[test]
fn missing_country_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = write_sources(dir.path());
    sources.countries = dir.path().join("missing.txt");
    let mut store = LocalWarehouse::open(dir.path().join("warehouse")).unwrap();

    let err = run(&sources, &mut store, &options("2024010100", 0)).unwrap_err();
    assert_eq!(FailureReport::from(&err).kind, FailureKind::LoadError);
}

#[test]
fn blank_line_in_country_file_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let sources = write_sources(dir.path());
    fs::write(
        &sources.countries,
        "US\tUSA\t840\tUS\tUnited States\n\nCA\tCAN\t124\tCA\tCanada\n",
    )
    .unwrap();
    let root = dir.path().join("warehouse");
    let mut store = LocalWarehouse::open(&root).unwrap();

    let err = run(&sources, &mut store, &options("2024010100", 0)).unwrap_err();
    let report = FailureReport::from(&err);
    assert_eq!(report.kind, FailureKind::LoadError);
    let detail = report.error.unwrap();
    assert!(detail.contains("malformed line 2"), "{detail}");
    assert!(detail.contains("found 0"), "{detail}");
    assert!(!root.join(CATALOG_FILE).exists());
}
