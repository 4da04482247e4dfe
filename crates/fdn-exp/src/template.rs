use std::path::{Path, PathBuf};

/// Encodes `params` as `_{name}{value}` segments in the given order.
pub fn encode_suffix<S: AsRef<str>>(params: &[(&str, S)]) -> String {
    params
        .iter()
        .map(|(name, value)| format!("_{}{}", name, value.as_ref()))
        .collect()
}

/// Derives a per-run output path from a base template.
///
/// The encoded parameters are inserted right before the extension of the
/// final path component, so `out/pairs.pkl` becomes
/// `out/pairs_alpha0.1_N10.pkl`. Paths without an extension get the suffix
/// appended. Equal parameters always produce equal paths.
pub fn derive_path<S: AsRef<str>>(base: impl AsRef<Path>, params: &[(&str, S)]) -> PathBuf {
    let base = base.as_ref();
    let suffix = encode_suffix(params);
    let name = match (base.file_stem(), base.extension()) {
        (Some(stem), Some(extension)) => {
            let mut name = stem.to_os_string();
            name.push(&suffix);
            name.push(".");
            name.push(extension);
            name
        }
        _ => {
            let mut name = base.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            name.push(&suffix);
            name
        }
    };
    base.with_file_name(name)
}
