use std::path::PathBuf;

fn cast2mp4_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_cast2mp4")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "cast2mp4.exe"
            } else {
                "cast2mp4"
            });
            p
        })
}

#[test]
fn missing_input_fails_before_launching_anything() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let missing = dir.join("does-not-exist.cast");
    let _ = std::fs::remove_file(&missing);

    let output = std::process::Command::new(cast2mp4_exe())
        .arg(&missing)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));

    // The failure names the attempted absolute path.
    let stderr = String::from_utf8_lossy(&output.stderr);
    let resolved = std::path::absolute(&missing).unwrap();
    assert!(
        stderr.contains(&resolved.display().to_string()),
        "stderr was: {stderr}"
    );
}

#[test]
fn rejects_unknown_theme_at_the_cli_boundary() {
    let output = std::process::Command::new(cast2mp4_exe())
        .args(["demo.cast", "--theme", "hotdog-stand"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--theme"), "stderr was: {stderr}");
}

#[test]
fn help_lists_the_conversion_flags() {
    let output = std::process::Command::new(cast2mp4_exe())
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--output", "--width", "--height", "--theme", "--speed", "--scale"] {
        assert!(stdout.contains(flag), "missing {flag} in help:\n{stdout}");
    }
}
