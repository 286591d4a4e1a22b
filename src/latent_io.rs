use npyz::WriterBuilder;
use std::fs;
use std::path::Path;

// --- Latent Vector Files ---

/// Writes a recovered latent vector as a one-dimensional `.npy` file of
/// little-endian `f32`, so it can be inspected or reused with the usual
/// numpy tooling.
pub fn save_latent(path: &Path, latent: &[f32]) {
    let mut buf = Vec::new();
    {
        let mut writer = npyz::WriteOptions::new()
            .default_dtype()
            .shape(&[latent.len() as u64])
            .writer(&mut buf)
            .begin_nd()
            .expect("Failed to begin npy file");
        writer
            .extend(latent.iter().copied())
            .expect("Failed to write latent values");
        writer.finish().expect("Failed to finish npy file");
    }
    fs::write(path, buf)
        .unwrap_or_else(|e| panic!("Failed to write latent file {}: {e}", path.display()));
    println!("Saved latent vector to {}", path.display());
}

/// Reads a latent vector back from a `.npy` file, e.g. to warm-start the
/// recovery from a known vector or to render a previously recovered one.
pub fn load_latent(path: &Path) -> Vec<f32> {
    let bytes = fs::read(path)
        .unwrap_or_else(|e| panic!("Latent file {} not found: {e}", path.display()));
    npyz::NpyFile::new(&bytes[..])
        .expect("Invalid npy file")
        .into_vec::<f32>()
        .expect("Latent file does not contain f32 data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latent_survives_save_and_load() {
        let dir = std::env::temp_dir().join("ganrecover_latent_io_test");
        fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("zp.npy");

        let latent: Vec<f32> = (0..128).map(|i| (i as f32 - 64.0) * 0.01).collect();
        save_latent(&path, &latent);
        let restored = load_latent(&path);

        assert_eq!(restored, latent);
    }
}
