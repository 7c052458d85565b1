//! Asset ingestion: still images and clips normalized into frame banks.

/// Frame banks and source selection.
pub mod bank;
pub(crate) mod decode;
/// Decoded frame storage.
pub mod frame;
/// Frame banks bound to keyboard keys.
pub mod key_assets;
/// `ffprobe`/`ffmpeg` clip decoding.
pub mod media;
