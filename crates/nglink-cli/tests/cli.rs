//! Runs the ng-link binary end to end.

use std::fs;
use std::process::Command;

fn ng_link() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ng-link"))
}

#[test]
fn build_writes_state_and_prints_link() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.json");
    fs::write(
        &input,
        r#"{
            "dimensions": {"z": {"voxel_size": 2.0, "unit": "microns"}},
            "layers": [{"source": "image_path.zarr", "channel": 0}]
        }"#,
    )
    .unwrap();
    let out_dir = dir.path().join("src");

    let output = ng_link()
        .arg("build")
        .arg(&input)
        .args(["--bucket", "aind-msma-data", "--output-dir"])
        .arg(&out_dir)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "https://neuroglancer-demo.appspot.com/#!s3://aind-msma-data/src/process_output.json"
    );

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("process_output.json")).unwrap()).unwrap();
    assert_eq!(written["layers"][0]["name"], "image_path_0");
}

#[test]
fn build_rejects_unknown_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.json");
    fs::write(&input, r#"{"dimensions": {}, "layers": []}"#).unwrap();

    let output = ng_link()
        .arg("build")
        .arg(&input)
        .args(["--bucket", "b", "--scheme", "ftp", "--output-dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--scheme"));
}

#[test]
fn points_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let xml = dir.path().join("cells.xml");
    fs::write(
        &xml,
        "<CellCounter_Marker_File><Marker_Data><Marker_Type><Type>1</Type>\
         <Marker><MarkerX>10</MarkerX><MarkerY>20</MarkerY><MarkerZ>30</MarkerZ></Marker>\
         </Marker_Type></Marker_Data></CellCounter_Marker_File>",
    )
    .unwrap();
    let out = dir.path().join("cells.json");

    let status = ng_link().arg("points").arg(&xml).arg("-o").arg(&out).status().unwrap();
    assert!(status.success());

    let points: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(points, serde_json::json!([{"x": 10.0, "y": 20.0, "z": 30.0}]));
}
