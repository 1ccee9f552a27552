use routestats::analysis::{CorrelationReport, HourlyReport, RoutesReport, SummaryReport};
use serde::de::DeserializeOwned;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn run_bin(args: &[&str]) -> Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_routestats"));

    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command")
}

fn run_bin_ok(args: &[&str]) {
    let output = run_bin(args);

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn read_results<T: DeserializeOwned>(dir: &Path, name: &str) -> T {
    let contents = fs::read_to_string(dir.join(format!("results-{name}.json")))
        .expect("failed to read results file");
    serde_json::from_str(&contents).expect("failed to deserialize results file")
}

fn setup_dir(name: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    test_dir
}

#[test]
fn basic_workflow() {
    // glob metacharacters in the directory name must match literally
    let test_dir = setup_dir("basic_workflow[1]*");

    let config_contents = String::new() + "[output]\n" + "decimals = 3\n";
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config");

    let latest = r#"[
        {"timestamp": "2025-05-01T08:00:00", "route_id": "1", "aqi": 42, "delay_ratio": 1.5,
         "driving_travel_time": 20, "transit_travel_time": 30,
         "start_location": "Athens", "end_location": "Piraeus"},
        {"timestamp": "2025-05-01T08:00:00", "route_id": "2", "aqi": 58, "delay_ratio": 2.25,
         "driving_travel_time": 16, "transit_travel_time": 36,
         "start_location": "Marousi", "end_location": "Athens"}
    ]"#;
    fs::write(test_dir.join("latest.json"), latest).expect("failed to write latest");

    let hourly = r#"[
        {"hour": 9, "route_id": 1, "day_type": "weekday", "avg_aqi": 60,
         "avg_delay_ratio": 1.9, "avg_driving_time": 25, "avg_transit_time": 47.5},
        {"hour": 8, "route_id": 1, "day_type": "weekday", "avg_aqi": 50,
         "avg_delay_ratio": 1.7, "avg_driving_time": 24, "avg_transit_time": 40.8},
        {"hour": 8, "route_id": 1, "day_type": "weekend", "avg_aqi": 30,
         "avg_delay_ratio": 1.2, "avg_driving_time": 18, "avg_transit_time": 21.6}
    ]"#;
    fs::write(test_dir.join("hourly_averages.json"), hourly).expect("failed to write hourly");

    let same_minute = r#"{"delay_ratio": [1, 2, 3, 4, 5], "aqi": [2, 4, 6, 8, 10]}"#;
    fs::write(test_dir.join("correlation-Athens-same_minute.json"), same_minute)
        .expect("failed to write correlation");
    let plus_one_hour = r#"{"delay_ratio": [1.5, 1.5, 1.5], "aqi": [30, 40, 50]}"#;
    fs::write(test_dir.join("correlation-Athens-plus_one_hour.json"), plus_one_hour)
        .expect("failed to write correlation");
    let inverse = r#"{"delay_ratio": [1, 2, 3], "aqi": [60, 40, 20]}"#;
    fs::write(test_dir.join("correlation-Nea Smyrni-same_minute.json"), inverse)
        .expect("failed to write correlation");
    fs::write(test_dir.join("correlation-Athens-unknown.json"), same_minute)
        .expect("failed to write correlation");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin_ok(&["--data-dir", test_dir_str, "analyze"]);

    let summary: SummaryReport = read_results(&test_dir, "summary");
    assert_eq!(summary.n_updates, 2);
    assert_eq!(summary.avg_aqi, Some(50.0));
    assert_eq!(summary.avg_delay_ratio, Some(1.875));

    let routes: RoutesReport = read_results(&test_dir, "routes");
    assert_eq!(routes.options.len(), 2);
    assert_eq!(routes.options[0].label, "Route 1: Athens - Piraeus");

    let corr: CorrelationReport = read_results(&test_dir, "correlation-Athens-same_minute");
    assert_eq!(corr.start_location, "Athens");
    assert_eq!(corr.trend, Some([[1.0, 2.0], [5.0, 10.0]]));
    assert_eq!(corr.r, Some(1.0));
    assert_eq!(corr.r2, Some(1.0));

    let corr: CorrelationReport = read_results(&test_dir, "correlation-Nea Smyrni-same_minute");
    assert_eq!(corr.start_location, "Nea Smyrni");
    assert_eq!(corr.r, Some(-1.0));

    let corr: CorrelationReport = read_results(&test_dir, "correlation-Athens-plus_one_hour");
    assert_eq!(corr.n_samples, 3);
    assert_eq!(corr.trend, None);
    assert_eq!(corr.r, None);

    run_bin_ok(&[
        "--data-dir",
        test_dir_str,
        "hourly",
        "--route-id",
        "1",
        "--day-type",
        "weekday",
        "--metric",
        "avg-aqi",
    ]);

    run_bin_ok(&[
        "--data-dir",
        test_dir_str,
        "hourly",
        "--route-id",
        "1",
        "--day-type",
        "weekend",
        "--metric",
        "avg-transit-time",
    ]);

    let hourly: HourlyReport = read_results(&test_dir, "hourly-1-weekday-avg_aqi");
    assert_eq!(hourly.bars.len(), 2);
    assert_eq!(hourly.bars[0].hour, 8);
    assert_eq!(hourly.average, Some(55.0));

    let hourly: HourlyReport = read_results(&test_dir, "hourly-1-weekend-avg_transit_time");
    assert_eq!(hourly.bars.len(), 1);
    assert_eq!(hourly.average, Some(21.6));

    fs::remove_file(test_dir.join("results-correlation-Athens-same_minute.json"))
        .expect("failed to remove results file");
    run_bin_ok(&[
        "--data-dir",
        test_dir_str,
        "correlate",
        "--start-location",
        "Athens",
        "--kind",
        "same-minute",
    ]);
    let corr: CorrelationReport = read_results(&test_dir, "correlation-Athens-same_minute");
    assert_eq!(corr.r, Some(1.0));

    run_bin_ok(&["--data-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("results-summary.json").exists());
    assert!(!test_dir.join("results-hourly-1-weekday-avg_aqi.json").exists());
    assert!(test_dir.join("latest.json").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn missing_input_fails() {
    let test_dir = setup_dir("missing_input_fails");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let output = run_bin(&[
        "--data-dir",
        test_dir_str,
        "correlate",
        "--start-location",
        "Athens",
        "--kind",
        "plus-two-hours",
    ]);
    assert!(!output.status.success());

    let output = run_bin(&[
        "--data-dir",
        test_dir_str,
        "correlate",
        "--start-location",
        "../Athens",
        "--kind",
        "same-minute",
    ]);
    assert!(!output.status.success());

    fs::write(test_dir.join("config.toml"), "[output]\ndecimals = 20\n")
        .expect("failed to write config");
    let output = run_bin(&["--data-dir", test_dir_str, "summary"]);
    assert!(!output.status.success());

    fs::remove_dir_all(&test_dir).ok();
}
