#![forbid(unsafe_code)]

// Build information is recorded as compile time environment variables.
// Outside of a git checkout the git values are reported as "unknown".
const UNKNOWN: &str = "unknown";

fn main() {
    let branch = build_data::get_git_branch().unwrap_or_else(|_| UNKNOWN.to_string());
    let commit = build_data::get_git_commit_short().unwrap_or_else(|_| UNKNOWN.to_string());
    let dirty = match build_data::get_git_dirty() {
        Ok(d) => d.to_string(),
        Err(_) => UNKNOWN.to_string(),
    };
    // Using the build timestamp makes the build unreproducible.
    let source_ts = match build_data::get_source_time() {
        Ok(t) => build_data::format_timestamp(t),
        Err(_) => UNKNOWN.to_string(),
    };
    let rustc = build_data::get_rustc_version().unwrap_or_else(|_| UNKNOWN.to_string());

    println!("cargo:rustc-env=GIT_BRANCH={}", branch);
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", commit);
    println!("cargo:rustc-env=GIT_DIRTY={}", dirty);
    println!("cargo:rustc-env=SOURCE_TIMESTAMP={}", source_ts);
    println!("cargo:rustc-env=RUSTC_VERSION={}", rustc);

    // Tells cargo not to rebuild build.rs during debug builds when other files change.
    //build_data::no_debug_rebuilds();
}
