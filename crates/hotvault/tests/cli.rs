// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the compiled binary against throwaway config files.

use std::process::Command;

fn hotvault() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hotvault"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn config_command_prints_effective_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hotvault.toml");
    std::fs::write(
        &path,
        format!(
            "[server]\nport = 6100\n\n[storage]\ndata_dir = \"{}\"\n",
            dir.path().join("data").display()
        ),
    )
    .unwrap();

    let output = hotvault()
        .args(["config", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("port = 6100"));
    assert!(stdout.contains("passphrase_kdf_iterations = 600000"));
}

#[test]
fn unknown_key_fails_with_suggestion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hotvault.toml");
    std::fs::write(&path, "[server]\nprot = 6100\n").unwrap();

    let output = hotvault()
        .args(["config", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prot"), "{stderr}");
    assert!(stderr.contains("port"), "{stderr}");
}

#[test]
fn no_subcommand_prints_hint() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hotvault.toml");
    std::fs::write(&path, "").unwrap();

    let output = hotvault().arg("--config").arg(&path).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--help"));
}
