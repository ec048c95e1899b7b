use std::fs;
use std::path::{Path, PathBuf};

fn rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn rel(path: &Path) -> String {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();
    rel.replace('\\', "/")
}

fn assert_files_avoid(files: &[PathBuf], forbidden: &[&str]) {
    let mut violations = Vec::new();
    for file in files {
        let content = fs::read_to_string(file).unwrap_or_default();
        for needle in forbidden {
            if content.contains(needle) {
                violations.push(format!(
                    "{} imports forbidden dependency `{}`",
                    rel(file),
                    needle
                ));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "Layering violations:\n{}",
        violations.join("\n")
    );
}

/// Records, the estimator, and the filter layer are pure value code: no OS
/// queries, no platform shims, no process spawning.
#[test]
fn pure_modules_stay_pure() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let files = vec![
        root.join("src/filter.rs"),
        root.join("src/system/records.rs"),
        root.join("src/system/cpu.rs"),
    ];
    assert_files_avoid(
        &files,
        &["sysinfo", "netstat2", "platform", "std::process::Command"],
    );
}

/// The store orchestrates collectors but owns no threads; only the
/// scheduler spawns.
#[test]
fn store_does_not_spawn_threads() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    assert_files_avoid(&[root.join("src/system/store.rs")], &["thread::spawn"]);
}

/// Control actions bypass the snapshot store by design.
#[test]
fn control_module_does_not_touch_the_store() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    assert_files_avoid(
        &[root.join("src/system/control.rs")],
        &["SnapshotStore", "store::"],
    );
}

/// Platform shims are reached only through system::platform dispatch.
#[test]
fn platform_impls_are_cfg_gated() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/system/platform");
    for file in rs_files(&root) {
        if rel(&file).ends_with("mod.rs") {
            continue;
        }
        let content = fs::read_to_string(&file).unwrap_or_default();
        assert!(
            content.contains("impl PlatformExtensions for Platform"),
            "{} must implement PlatformExtensions",
            rel(&file)
        );
    }
}
