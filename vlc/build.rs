// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Build script for the `vlc` crate.
//!
//! This script generates `constants.rs` containing the optional directory of
//! the libvlc shared library, taken from the `LIBVLC_LIB_DIR` environment
//! variable. It is used by the configuration module to locate the library.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=LIBVLC_LIB_DIR");

    let lib_dir = env::var("LIBVLC_LIB_DIR").ok().filter(|dir| !dir.is_empty());

    // Generate constants.rs in the build output directory
    let out_path = PathBuf::from(env::var("OUT_DIR").expect("failed to get output directory"))
        .join("constants.rs");

    let data = format!(
        "pub const LIBVLC_LIB_DIR: Option<&str> = {:?};\n",
        lib_dir
    );
    std::fs::write(out_path, data).expect("Unable to write file");
}
