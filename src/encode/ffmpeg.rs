use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::canvas::Canvas;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// `-c:v` encoder name.
    pub codec: String,
}

impl FfmpegSinkOpts {
    /// Create options for `out_path` with the default `libx264` codec, replacing any existing file.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: "libx264".to_owned(),
        }
    }
}

/// Streams rgb24 frames into a system `ffmpeg` process writing an MP4 without audio.
///
/// Dropping a started sink without calling `end` still closes the stream and waits for
/// `ffmpeg`, so the container is finalized.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl FfmpegSink {
    /// Create an idle sink; `ffmpeg` is spawned on [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
            frames_written: 0,
        }
    }

    /// Destination MP4 path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    /// Frames streamed to `ffmpeg` since the last `begin`.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn finish(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            self.discard_output();
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }

        tracing::info!(
            path = %self.opts.out_path.display(),
            frames = self.frames_written,
            "video finalized"
        );
        Ok(())
    }

    /// Remove the output claimed by `begin`. Only ever called for a file this run created.
    fn discard_output(&self) {
        if let Err(e) = std::fs::remove_file(&self.opts.out_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %self.opts.out_path.display(),
                error = %e,
                "could not remove partial output"
            );
        }
    }
}

/// Reserve `path` for this run before `ffmpeg` starts.
///
/// Without `overwrite` the file is created exclusively, so an existing or concurrently created
/// file is reported and left untouched.
pub(crate) fn claim_output(path: &Path, overwrite: bool) -> ReelResult<()> {
    let mut open = std::fs::OpenOptions::new();
    open.write(true);
    if overwrite {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    match open.open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(ReelError::validation(
            format!("output file '{}' already exists", path.display()),
        )),
        Err(e) => Err(ReelError::encode(format!(
            "failed to create output '{}': {e}",
            path.display()
        ))),
    }
}

/// Reject stream parameters `libx264`/`yuv420p` cannot take.
pub fn validate_sink_config(cfg: &SinkConfig) -> ReelResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(ReelError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(ReelError::validation(
            "ffmpeg sink width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(ReelError::validation(
            "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    Ok(())
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        validate_sink_config(&cfg)?;
        if self.child.is_some() {
            return Err(ReelError::encode("ffmpeg sink already started"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        claim_output(&self.opts.out_path, self.opts.overwrite)?;
        if !is_ffmpeg_on_path() {
            self.discard_output();
            return Err(ReelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // Own process group: a terminal Ctrl-C reaches only the render loop, which then finalizes.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut cmd, 0);
        // The output was claimed above; ffmpeg replaces the placeholder.
        cmd.arg("-y");
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            &self.opts.codec,
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.discard_output();
                return Err(ReelError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                )));
            }
        };
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::info!(
            path = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            codec = %self.opts.codec,
            "encoder started"
        );
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, canvas: &Canvas) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(ReelError::encode(format!(
                "ffmpeg sink received out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }
        if canvas.width() != cfg.width || canvas.height() != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                canvas.width(),
                canvas.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.last_idx = Some(idx);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };
        stdin.write_all(canvas.data()).map_err(|e| {
            ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        if self.child.is_none() {
            return Err(ReelError::encode("ffmpeg sink not started"));
        }
        self.finish()
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some()
            && let Err(err) = self.finish()
        {
            tracing::error!(error = %err, "ffmpeg finalization on drop failed");
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
