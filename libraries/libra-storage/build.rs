//! Build script for libra-storage.
//!
//! Rebuild when either engine's migrations change.

fn main() {
    println!("cargo:rerun-if-changed=migrations/sqlite");
    println!("cargo:rerun-if-changed=migrations/postgres");
}
