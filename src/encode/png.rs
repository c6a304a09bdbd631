use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::ReelResult;
use crate::render::frame::FrameRGBA;

/// Writes each frame to `<dir>/frame_<index:06>.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .context("png sink received a frame before begin()")?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(anyhow::anyhow!(
                "frame {} is {}x{}, sink expects {}x{}",
                idx.0,
                frame.width,
                frame.height,
                cfg.width,
                cfg.height
            )
            .into());
        }

        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        tracing::debug!(
            dir = %self.dir.display(),
            frames = self.written.len(),
            "png sequence written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "reelscript_png_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ))
    }

    #[test]
    fn writes_numbered_pngs() {
        let dir = scratch_dir("seq");
        let mut sink = PngSequenceSink::new(&dir);
        sink.begin(SinkConfig {
            width: 2,
            height: 1,
            fps: 24,
        })
        .unwrap();

        let frame = FrameRGBA {
            index: FrameIndex(7),
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 255, 0, 255, 0, 255],
        };
        sink.push_frame(FrameIndex(7), &frame).unwrap();
        sink.end().unwrap();

        let path = dir.join("frame_000007.png");
        assert_eq!(sink.dir(), dir.as_path());
        assert_eq!(sink.written(), &[path.clone()]);
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn push_before_begin_fails() {
        let mut sink = PngSequenceSink::new(scratch_dir("early"));
        let frame = FrameRGBA {
            index: FrameIndex(0),
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
        };
        assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    }
}
