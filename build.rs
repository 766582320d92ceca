use std::path::Path;
use std::process::Command;

/// Files whose change means HEAD may point at a new commit.
const GIT_WATCH: [&str; 3] = [".git/HEAD", ".git/refs", ".git/packed-refs"];

fn main() {
    let hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=TOUCHREMOTE_GIT_HASH={hash}");

    for path in GIT_WATCH.iter().filter(|p| Path::new(p).exists()) {
        println!("cargo:rerun-if-changed={path}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
