use std::path::Path;

use assert_cmd::Command;

const TEMPERATURE_REGISTRY: &str = r#"
[data-types]
fever = "temp.tenth"

[[dimensions.temp.units]]
name = "degree"
label = "°C"
base = true
precision = 1
plausible-min = "34"
plausible-max = "43"

[[dimensions.temp.units]]
name = "tenth"
label = "d°C"
base-multiplier = "0.1"
precision = 0
plausible-min = "34"
plausible-max = "43"

[[dimensions.temp.units]]
name = "hundredth"
label = "c°C"
base-multiplier = "0.01"
precision = 0
"#;

fn chart_units() -> Command {
    let mut cmd = Command::cargo_bin("chart-units").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn with_registry(registry: &Path, args: &[&str]) -> Command {
    let mut cmd = chart_units();
    cmd.arg("--registry").arg(registry).args(args);
    cmd
}

fn success(mut cmd: Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn failure(mut cmd: Command) -> String {
    let output = cmd.output().unwrap();
    assert!(!output.status.success(), "command unexpectedly succeeded");
    String::from_utf8(output.stderr).unwrap()
}

fn stdout_of(args: &[&str]) -> String {
    let mut cmd = chart_units();
    cmd.args(args);
    success(cmd)
}

fn stderr_of_failure(args: &[&str]) -> String {
    let mut cmd = chart_units();
    cmd.args(args);
    failure(cmd)
}

fn json_of(args: &[&str]) -> serde_json::Value {
    let mut cmd = chart_units();
    cmd.args(["--format", "json"]).args(args);
    serde_json::from_str(&success(cmd)).unwrap()
}

fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "{:?} not found in:\n{}",
        needle,
        haystack
    );
}

#[test]
fn test_convert() {
    assert_eq!(
        stdout_of(&["convert", "72", "length.inch", "length.centimeter"]),
        "182.9 cm\n"
    );
    assert_eq!(
        stdout_of(&["convert", "1.5", "time.year", "time.month", "-s", "long"]),
        "18 month\n"
    );
    assert_eq!(
        stdout_of(&["convert", "14", "time.day", "time.week", "-s", "compact"]),
        "2\n"
    );
    assert_eq!(
        stdout_of(&["convert", "-40", "length.centimeter", "length.meter"]),
        "-0.4 m\n"
    );
}

#[test]
fn test_convert_errors() {
    let stderr = stderr_of_failure(&["convert", "1", "length.meter", "weight.kilogram"]);
    assert_contains(&stderr, "Dimension mismatch");

    let stderr = stderr_of_failure(&["convert", "1", "lengthmeter", "length.inch"]);
    assert_contains(&stderr, "Malformed unit path");

    let stderr = stderr_of_failure(&["convert", "1,5", "length.meter", "length.inch"]);
    assert_contains(&stderr, "invalid value");
}

#[test]
fn test_convert_json() {
    let json = json_of(&["convert", "10", "weight.pound", "weight.kilogram"]);
    assert_eq!(json["input"]["number"], "10");
    assert_eq!(json["input"]["unit"], "weight.pound");
    assert_eq!(json["output"]["number"], "4.5359237");
    assert_eq!(json["output"]["unit"], "weight.kilogram");
    assert_eq!(json["text"], "4.54 kg");
}

#[test]
fn test_check() {
    assert_eq!(
        stdout_of(&["check", "5", "length.centimeter"]),
        "5 cm: too low\n"
    );
    assert_eq!(
        stdout_of(&["check", "12.5", "--data-type", "bodyweight"]),
        "12.5 kg: ok\n"
    );
    assert_eq!(
        stdout_of(&["check", "30", "time.second"]),
        "30 s: undefined\n"
    );

    let json = json_of(&["check", "700", "weight.pound"]);
    assert_eq!(json["plausibility"], "too-high");

    let stderr = stderr_of_failure(&["check", "1", "--data-type", "shoesize"]);
    assert_contains(&stderr, "No default unit for data type 'shoesize'");
}

#[test]
fn test_check_requires_unit_or_data_type() {
    let stderr = stderr_of_failure(&["check", "1"]);
    assert_contains(&stderr, "required");

    let stderr = stderr_of_failure(&["check", "1", "length.meter", "--data-type", "age"]);
    assert_contains(&stderr, "cannot be used with");
}

#[test]
fn test_range() {
    assert_eq!(
        stdout_of(&["range", ">= 2.5", "2.4", "2.5"]),
        "≥ 2.5\n2.4: too low\n2.5: ok\n"
    );

    let args = ["range", "1 - 2", "0.999", "2", "2.001", "-s", "brackets"];
    assert_eq!(
        stdout_of(&args),
        "[1,2]\n0.999: too low\n2: ok\n2.001: too high\n"
    );
    assert_eq!(stdout_of(&["range", "< 100", "-5"]), "< 100\n-5: ok\n");

    let stderr = stderr_of_failure(&["range", "sometimes"]);
    assert_contains(&stderr, "could not parse range 'sometimes'");
}

#[test]
fn test_range_json() {
    let json = json_of(&["range", ">1 -< 2", "1", "1.5"]);
    assert_eq!(json["range"], ">1 - <2");
    assert_eq!(json["from"], "1");
    assert_eq!(json["including-from"], false);
    assert_eq!(json["to"], "2");
    assert_eq!(json["including-to"], false);
    assert_eq!(json["results"][0]["result"], "too-low");
    assert_eq!(json["results"][1]["result"], "ok");
}

#[test]
fn test_units_listing() {
    let stdout = stdout_of(&["units"]);
    for dimension in ["bmi", "length", "percentile", "time", "weight"] {
        assert_contains(&stdout, dimension);
    }

    let stdout = stdout_of(&["units", "length"]);
    assert_contains(&stdout, "meter (base)");
    assert_contains(&stdout, "0.0254");
    assert_contains(&stdout, "[0.1,2.8]");

    let json = json_of(&["units", "weight"]);
    let units = json.as_array().unwrap();
    let names: Vec<_> = units.iter().map(|unit| &unit["name"]).collect();
    assert_eq!(names, ["kilogram", "gram", "pound", "ounce"]);
    assert_eq!(units[0]["path"], "weight.kilogram");

    let stderr = stderr_of_failure(&["units", "volume"]);
    assert_contains(&stderr, "Unknown dimension 'volume'");
}

#[test]
fn test_data_types_json() {
    let json = json_of(&["data-types"]);
    assert_eq!(json["bodyweight"], "weight.kilogram");
    assert_eq!(json["age"], "time.month");
}

#[test]
fn test_custom_registry() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), TEMPERATURE_REGISTRY).unwrap();
    let registry = file.path();

    let convert = ["convert", "37.25", "temp.degree", "temp.tenth"];
    assert_eq!(success(with_registry(registry, &convert)), "373 d°C\n");

    let check = ["check", "395", "--data-type", "fever"];
    assert_eq!(success(with_registry(registry, &check)), "395 d°C: ok\n");

    // Bounds belong to each unit; `hundredth` declares none.
    let check = ["check", "3950", "temp.hundredth"];
    assert_eq!(
        success(with_registry(registry, &check)),
        "3950 c°C: undefined\n"
    );

    let stderr = failure(with_registry(registry, &["units", "length"]));
    assert_contains(&stderr, "Unknown dimension 'length'");

    let stderr = stderr_of_failure(&["--registry", "/nonexistent/units.toml", "units"]);
    assert_contains(&stderr, "failed to read");
}
