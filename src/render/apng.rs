//! Animated PNG output.

use super::raster::Rasterizer;
use super::{FrameSink, Scene};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes frames to an animated PNG file.
///
/// The file is created by [ApngWriter::create] and completed by [ApngWriter::finish].
/// If the writer is dropped early, the file handle is released but the file is
/// left incomplete.
pub struct ApngWriter {
    path: PathBuf,
    writer: png::Writer<BufWriter<File>>,
    raster: Rasterizer,
    expected: u32,
    written: u32,
}

impl ApngWriter {
    /// Renders the static markings of `scene`, then creates the file and
    /// writes the PNG header.
    ///
    /// # Parameters
    /// * `path` - The file to write
    /// * `scene` - The scene whose frames will be written
    /// * `num_frames` - The number of frames which will be written; must be at least one
    /// * `fps` - The playback rate in frames per second
    pub fn create(path: impl AsRef<Path>, scene: &Scene, num_frames: u32, fps: u16) -> Result<Self> {
        if num_frames == 0 {
            return Err(Error::EmptyAnimation);
        }
        let raster = Rasterizer::new(scene)?;
        let size = scene.size();
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;

        let mut encoder = png::Encoder::new(BufWriter::new(file), size.0, size.1);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(num_frames, 0)?;
        encoder.set_frame_delay(1, fps.max(1))?;
        let writer = encoder.write_header()?;

        log::debug!(
            "Writing {} frames of {}x{} px to {}",
            num_frames,
            size.0,
            size.1,
            path.display()
        );
        Ok(Self {
            path,
            writer,
            raster,
            expected: num_frames,
            written: 0,
        })
    }

    /// Completes the file and flushes it to disk.
    pub fn finish(self) -> Result<PathBuf> {
        if self.written != self.expected {
            log::warn!(
                "{}: expected {} frames but {} were written",
                self.path.display(),
                self.expected,
                self.written
            );
        }
        self.writer.finish()?;
        log::info!("Wrote {} frames to {}", self.written, self.path.display());
        Ok(self.path)
    }
}

impl FrameSink for ApngWriter {
    fn write_frame(&mut self, _index: usize, scene: &Scene) -> Result<()> {
        // Frames have an opaque background, so premultiplied and straight alpha agree
        let pixmap = self.raster.frame(scene)?;
        self.writer.write_image_data(pixmap.data())?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::AnimationParams;
    use crate::Scenario;

    #[test]
    fn zero_frames_is_rejected_before_creating_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let scene = Scene::new(&Scenario::new(100.0, vec![]), &AnimationParams::default());
        assert!(matches!(
            ApngWriter::create(&path, &scene, 0, 15),
            Err(Error::EmptyAnimation)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn unrenderable_size_is_rejected_before_creating_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        let params = AnimationParams {
            height: 0,
            ..Default::default()
        };
        let scene = Scene::new(&Scenario::new(100.0, vec![]), &params);
        assert!(matches!(
            ApngWriter::create(&path, &scene, 3, 15),
            Err(Error::Canvas { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn writes_a_decodable_animation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.png");
        let params = AnimationParams {
            width: 80,
            height: 40,
            ..Default::default()
        };
        let scene = Scene::new(&Scenario::new(100.0, vec![50.0]), &params);

        let mut writer = ApngWriter::create(&path, &scene, 3, 15).unwrap();
        for i in 0..3 {
            writer.write_frame(i, &scene).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), path);

        let decoder = png::Decoder::new(std::io::BufReader::new(File::open(&path).unwrap()));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (80, 40));
        let control = info.animation_control.unwrap();
        assert_eq!(control.num_frames, 3);
    }
}
