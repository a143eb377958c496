use std::process::Command;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fall back to the crate version outside a git checkout
    let describe = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE={}", describe);
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
