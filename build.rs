use std::process::Command;

#[path = "src/release_tag.rs"]
mod release_tag;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    let fallback = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    // Only an exact release tag on HEAD overrides the manifest version.
    let output = Command::new("git")
        .args(["describe", "--tags", "--exact-match"])
        .output();

    let version = match output {
        Ok(o) if o.status.success() => {
            let tag = String::from_utf8(o.stdout).unwrap_or_default();
            let tag = tag.trim();
            if release_tag::is_release_tag(tag) {
                tag.to_string()
            } else {
                fallback
            }
        }
        _ => fallback,
    };

    println!("cargo:rustc-env=WALDUR_CLIENT_VERSION={}", version);
}
