//! Animation of a recorded simulation.
//!
//! An [Animator] walks the snapshot sequence in order, lays out each snapshot,
//! updates a persistent [Scene] and hands it to one or more [FrameSink]s.

use crate::error::{Error, Result};
use crate::layout::{layout, LayoutParams};
use crate::snapshot::Snapshot;
use crate::Scenario;
use std::path::{Path, PathBuf};

pub use apng::ApngWriter;
pub use raster::Rasterizer;
pub use scene::{Scene, Stripe, Viewport};
pub use svg::{EmbeddedAnimation, SvgWriter};

mod apng;
mod raster;
mod scene;
mod svg;

/// Parameters of an animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationParams {
    /// The maximum number of snapshots to animate.
    pub frame_limit: usize,
    /// The layout of the road diagram.
    pub layout: LayoutParams,
    /// The length of a zebra crossing's stripes along the road, in m.
    pub length: f64,
    /// The number of stripes in each zebra crossing.
    pub n_stripes: usize,
    /// Whether to write the animated image file.
    pub write: bool,
    /// The playback rate of the animated image, in frames per second.
    pub fps: u16,
    /// The time each frame is shown in the embeddable animation, in ms.
    pub interval_ms: u32,
    /// The image width in pixels.
    pub width: u32,
    /// The image height in pixels.
    pub height: u32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            frame_limit: 2000,
            layout: LayoutParams::default(),
            length: 10.0,
            n_stripes: 7,
            write: true,
            fps: 15,
            interval_ms: 100,
            width: 1000,
            height: 400,
        }
    }
}

/// Receives the frames of an animation in order.
pub trait FrameSink {
    /// Consumes the scene as it stands for frame `index`.
    fn write_frame(&mut self, index: usize, scene: &Scene) -> Result<()>;
}

/// Drives the frame loop over a snapshot sequence.
pub struct Animator<'a> {
    scenario: &'a Scenario,
    params: AnimationParams,
    scene: Scene,
}

impl<'a> Animator<'a> {
    /// Creates an animator and draws the static scene.
    pub fn new(scenario: &'a Scenario, params: &AnimationParams) -> Self {
        Self {
            scenario,
            params: *params,
            scene: Scene::new(scenario, params),
        }
    }

    /// The scene in its current state.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The number of frames which will be rendered for `num_snapshots` snapshots.
    pub fn frame_count(&self, num_snapshots: usize) -> usize {
        usize::min(self.params.frame_limit, num_snapshots)
    }

    /// Renders the frames in order, passing each one to every sink.
    /// Snapshots past the frame limit are ignored.
    ///
    /// Returns the number of frames rendered.
    pub fn run(&mut self, snapshots: &[Snapshot], sinks: &mut [&mut dyn FrameSink]) -> Result<usize> {
        let count = self.frame_count(snapshots.len());
        if count < snapshots.len() {
            log::debug!(
                "Rendering the first {} of {} snapshots",
                count,
                snapshots.len()
            );
        }
        for (index, snapshot) in snapshots.iter().take(count).enumerate() {
            log::trace!("Frame {} at {} ms", index, snapshot.timestamp);
            let frame = layout(snapshot, self.scenario, &self.params.layout)?;
            self.scene.update(frame);
            for sink in sinks.iter_mut() {
                sink.write_frame(index, &self.scene)?;
            }
        }
        Ok(count)
    }
}

/// A rendered animation.
#[derive(Clone, Debug)]
pub struct Animation {
    /// The number of frames rendered.
    pub frames: usize,
    /// The animation as an embeddable SVG document.
    pub video: EmbeddedAnimation,
    /// The animated image file, if one was written.
    pub file: Option<PathBuf>,
}

/// Renders the snapshots as an embeddable animation and, if `params.write`
/// is set, as an animated PNG at `path`.
///
/// Fails with [Error::EmptyAnimation] if there are no frames to render,
/// before any file is created.
pub fn render(
    snapshots: &[Snapshot],
    scenario: &Scenario,
    params: &AnimationParams,
    path: impl AsRef<Path>,
) -> Result<Animation> {
    let mut animator = Animator::new(scenario, params);
    let count = animator.frame_count(snapshots.len());
    if count == 0 {
        return Err(Error::EmptyAnimation);
    }

    let mut video = SvgWriter::new(animator.scene(), params.interval_ms)?;
    let file = if params.write {
        let mut image = ApngWriter::create(path, animator.scene(), count as u32, params.fps)?;
        animator.run(snapshots, &mut [&mut video, &mut image])?;
        Some(image.finish()?)
    } else {
        animator.run(snapshots, &mut [&mut video])?;
        None
    };

    Ok(Animation {
        frames: count,
        video: video.finish()?,
        file,
    })
}
