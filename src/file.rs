//! File-level compress and decompress.
//!
//! Outputs are written through [`write_atomic`]: a failed run never leaves a
//! partially written container or bitmap at the destination.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bmp::{load_channels, store_channels};
use crate::codec::{self, DecodedImage, EncodeOptions, EncodeStats};
use crate::error::Result;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling path used while `path` is being written.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{unique}.tmp", std::process::id()))
}

/// Write `bytes` to `path` via a synced temporary sibling and a rename.
///
/// On error the temporary file is removed and `path` is left as it was.
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let temp = temp_path(path);

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Compress a BMP file into a container at `dst`.
///
/// The bitmap's shell is stored as the container trailer.
pub fn compress_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    options: &EncodeOptions,
) -> Result<EncodeStats> {
    let bitmap = load_channels(src)?;
    let (bytes, stats) = codec::encode_with_stats(&bitmap.planes, options, &bitmap.shell)?;
    write_atomic(dst, &bytes)?;
    Ok(stats)
}

/// Decompress a container at `src` into a BMP file at `dst`.
///
/// An empty trailer gets a synthesized standard header.
pub fn decompress_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<DecodedImage> {
    let data = fs::read(src)?;
    let image = codec::decode(&data)?;
    let shell = (!image.trailer.is_empty()).then_some(image.trailer.as_slice());
    store_channels(dst, &image.planes, shell)?;
    Ok(image)
}
