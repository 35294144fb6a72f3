// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of arguments files.

use std::fs;

use tempfile::TempDir;

use crate::{get_cmd_output, hera_tsky, make_inputs, read_output, Files};

#[test]
fn test_toml_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());
    let output = tmp_dir.path().join("from_toml.npz");
    let arg_file = tmp_dir.path().join("args.toml");
    fs::write(
        &arg_file,
        format!(
            r#"[tsky]
beam_file = "{beam}"
sky_file = "{sky}"
freq_start = 140.0
freq_end = 160.0
freq_res = 5.0
time_res = 4.0
pols = ["y"]

[simulate]
distortion = "widen=0.1"
output = "{}"
"#,
            output.display()
        ),
    )
    .unwrap();

    let cmd = hera_tsky()
        .args(["simulate", &arg_file.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (tsky, freqs, _) = read_output(&output);
    assert_eq!(tsky.dim(), (1, 4, 6));
    assert_eq!(freqs.len(), 4);
}

#[test]
fn test_json_arg_file_with_cli_override() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());
    let output = tmp_dir.path().join("from_json.npz");
    let arg_file = tmp_dir.path().join("args.json");
    fs::write(
        &arg_file,
        format!(
            r#"{{
    "tsky": {{
        "beam_file": "{beam}",
        "sky_file": "{sky}",
        "freq_start": 140.0,
        "freq_end": 160.0,
        "freq_res": 10.0,
        "time_res": 4.0
    }},
    "simulate": {{
        "output": "{}"
    }}
}}"#,
            output.display()
        ),
    )
    .unwrap();

    // The command line wins over the file.
    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "simulate", &arg_file.display().to_string(),
            "--freq-res", "5",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (tsky, freqs, lsts) = read_output(&output);
    assert_eq!(tsky.dim(), (2, 4, 6));
    assert_eq!(freqs.len(), 4);
    assert_eq!(lsts.len(), 6);
}

#[test]
fn test_save_toml_reproduces_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());
    let saved = tmp_dir.path().join("saved.toml");
    let first = tmp_dir.path().join("first");
    let second = tmp_dir.path().join("second");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "sweep",
            "--beam-file", &beam,
            "--sky-file", &sky,
            "--kind", "scale-lobes",
            "--fracs", "0.5",
            "--freq-start", "140",
            "--freq-end", "160",
            "--freq-res", "5",
            "--time-res", "4",
            "--output-dir", &first.display().to_string(),
            "--save-toml", &saved.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    assert!(saved.exists());
    let contents = fs::read_to_string(&saved).unwrap();
    assert!(contents.contains("[tsky]"), "{contents}");
    assert!(contents.contains("[sweep]"), "{contents}");

    // Re-run from the saved file into another directory.
    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "sweep", &saved.display().to_string(),
            "--output-dir", &second.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let name = "HERA_Tsky_scale-lobes_50_percent.npz";
    assert_eq!(read_output(&first.join(name)), read_output(&second.join(name)));
}

#[test]
fn test_bad_arg_file_extension() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.yaml");
    fs::write(&arg_file, "tsky: {}").unwrap();

    let cmd = hera_tsky()
        .args(["simulate", &arg_file.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("toml, json"), "{stderr}");
}
