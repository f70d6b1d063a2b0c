//! Stamps the binary with the commit it was built from (GIT_HASH)

use std::env;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() {
    // Packaged source trees have no .git; let the packager pass the hash in
    let git_hash = env::var("BILLSPLIT_GIT_HASH").ok().or_else(|| {
        let hash = git(&["rev-parse", "--short", "HEAD"])?;
        let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
            .is_some_and(|status| !status.is_empty());
        Some(if dirty { format!("{hash}-dirty") } else { hash })
    });

    println!("cargo:rustc-env=GIT_HASH={}", git_hash.as_deref().unwrap_or("unknown"));
    println!("cargo:rerun-if-env-changed=BILLSPLIT_GIT_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
