use std::process::Command;

/// First line of `program args..`, if it runs and succeeds.
fn probe(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    text.lines().next().map(|line| line.trim().to_string())
}

fn main() {
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=G3USI_BUILD_TARGET={target}");
    println!("cargo:rustc-env=G3USI_BUILD_PROFILE={profile}");

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    if let Some(version) = probe(&rustc, &["--version"]) {
        println!("cargo:rustc-env=G3USI_RUSTC_VERSION={version}");
    }
    if let Some(hash) = probe("git", &["rev-parse", "--short=12", "HEAD"]) {
        println!("cargo:rustc-env=G3USI_GIT_HASH={hash}");
    }

    println!("cargo:rerun-if-env-changed=TARGET");
    println!("cargo:rerun-if-env-changed=PROFILE");
    println!("cargo:rerun-if-changed=build.rs");
}
