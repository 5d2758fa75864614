use std::env;
use std::path::PathBuf;

const SCHEMA: &str = "schema/engine_config.schema.json";

// Records where the crate was built so installed binaries can still find
// schema/, config/ and assets/ when neither YGG_ROOT nor the executable's
// location points at them.
fn main() {
    println!("cargo:rerun-if-env-changed=YGG_ROOT_HINT");
    println!("cargo:rerun-if-changed={SCHEMA}");

    let Some(root) = env::var_os("YGG_ROOT_HINT")
        .or_else(|| env::var_os("CARGO_MANIFEST_DIR"))
        .map(PathBuf::from)
    else {
        return;
    };
    let root = root.canonicalize().unwrap_or(root);
    if root.join(SCHEMA).is_file() {
        println!("cargo:rustc-env=YGG_ROOT_HINT={}", root.display());
    } else {
        println!("cargo:warning=YGG_ROOT_HINT {} holds no {SCHEMA}", root.display());
    }
}
