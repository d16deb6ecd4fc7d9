//! Resolves the capability matrix for the target being built.
//!
//! Pre-definitions come from environment variables named after each flag
//! (`HAVE_ZSTD=1`) and from the Cargo features that link the optional
//! libraries. Operating-system primitives the builder left undefined are
//! probed from the target unless `KV_PORT_NO_PROBE` is set to a nonzero
//! value. Whatever is
//! still undefined resolves disabled.

use std::env;
use std::fs;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "src/config/matrix.rs"]
mod matrix;

use matrix::{definition_enabled, parse_definition, Capability, Definitions, Matrix, Origin};

const NO_PROBE: &str = "KV_PORT_NO_PROBE";

const FDATASYNC_TARGETS: &[&str] = &[
    "android", "freebsd", "fuchsia", "illumos", "linux", "netbsd", "solaris",
];

const FULLFSYNC_TARGETS: &[&str] = &["ios", "macos"];

const O_CLOEXEC_TARGETS: &[&str] = &[
    "android",
    "dragonfly",
    "freebsd",
    "fuchsia",
    "illumos",
    "ios",
    "linux",
    "macos",
    "netbsd",
    "openbsd",
    "solaris",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/config/matrix.rs");
    println!("cargo:rerun-if-env-changed={NO_PROBE}");

    let mut definitions = Definitions::new();

    for capability in Capability::ALL {
        println!("cargo:rustc-check-cfg=cfg({})", capability.cfg_name());
        println!("cargo:rerun-if-env-changed={}", capability.define_name());

        if let Some(feature) = capability.feature() {
            if feature_enabled(feature) {
                definitions.define(capability, 1);
            }
        }

        if let Ok(raw) = env::var(capability.define_name()) {
            match parse_definition(&raw) {
                Some(value) => {
                    definitions.define(capability, value);
                }
                None => println!(
                    "cargo:warning={}={raw:?} is not an integer; leaving it undefined",
                    capability.define_name()
                ),
            }
        }

        // A library that is not linked cannot be enabled by a definition.
        if let Some(feature) = capability.feature() {
            if !feature_enabled(feature) && definitions.get(capability).unwrap_or(0) != 0 {
                println!(
                    "cargo:warning={} is defined but the `{feature}` feature is off; \
                     the library is not linked, so the flag stays disabled",
                    capability.define_name()
                );
                definitions.undefine(capability);
            }
        }
    }

    if !probing_disabled() {
        let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
        probe_target(&mut definitions, &target_os);
    }

    let matrix = definitions.resolve();

    for capability in matrix.enabled() {
        println!("cargo:rustc-cfg={}", capability.cfg_name());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    fs::write(out_dir.join("capabilities.rs"), render(&matrix))
        .expect("failed to write capabilities.rs");
}

fn probing_disabled() -> bool {
    definition_enabled(env::var(NO_PROBE).ok().as_deref())
}

fn feature_enabled(feature: &str) -> bool {
    let var = format!("CARGO_FEATURE_{}", feature.to_uppercase().replace('-', "_"));
    env::var_os(var).is_some()
}

fn probe_target(definitions: &mut Definitions, target_os: &str) {
    let probes = [
        (Capability::Fdatasync, FDATASYNC_TARGETS),
        (Capability::Fullfsync, FULLFSYNC_TARGETS),
        (Capability::OCloexec, O_CLOEXEC_TARGETS),
    ];

    for (capability, targets) in probes {
        if targets.contains(&target_os) {
            definitions.probe(capability, 1);
        }
    }
}

fn render(matrix: &Matrix) -> String {
    let mut out = String::from(
        "// @generated by build.rs. Resolved capability matrix for this target.\n\n\
         /// Capability matrix resolved when this artifact was built.\n\
         pub const BUILD: Matrix = Matrix::from_flags([\n",
    );

    for (capability, resolved) in matrix.iter() {
        let origin = match resolved.origin {
            Origin::Default => "Default",
            Origin::Probed => "Probed",
            Origin::External => "External",
        };
        out.push_str(&format!(
            "    // {}\n    Resolved {{ value: {}, origin: Origin::{} }},\n",
            capability.define_name(),
            resolved.value,
            origin
        ));
    }

    out.push_str("]);\n");
    out
}
