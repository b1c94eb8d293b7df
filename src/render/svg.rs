//! Embeddable SVG output.
//!
//! Produces a single self-contained SVG document in which every frame is a group
//! made visible for one frame interval by a SMIL `<set>` animation. It needs no
//! video codec and can be inlined into an HTML page.

use super::{FrameSink, Scene};
use crate::error::Result;
use std::fmt::{self, Write as _};
use std::path::Path;

/// An animation as an SVG document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedAnimation {
    svg: String,
    frames: usize,
}

impl EmbeddedAnimation {
    /// The SVG document.
    pub fn as_svg(&self) -> &str {
        &self.svg
    }

    /// The number of frames in the animation.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Wraps the animation in a minimal HTML page.
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n{}</body>\n</html>\n",
            self.svg
        )
    }

    /// Writes the animation to a file, as an HTML page if the path ends in
    /// `.html` or `.htm` and as a bare SVG document otherwise.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
        let content = if is_html { self.to_html() } else { self.svg.clone() };
        std::fs::write(path, content)?;
        log::info!("Wrote embeddable animation to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for EmbeddedAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.svg)
    }
}

/// Collects frames into an [EmbeddedAnimation].
pub struct SvgWriter {
    header: String,
    frames: Vec<String>,
    interval_ms: u32,
}

impl SvgWriter {
    /// Starts a document holding the static road markings of the scene.
    pub fn new(scene: &Scene, interval_ms: u32) -> Result<Self> {
        let mut header = String::new();
        scene.write_open(&mut header)?;
        scene.write_markings(&mut header)?;
        Ok(Self {
            header,
            frames: vec![],
            interval_ms: interval_ms.max(1),
        })
    }

    /// Completes the document. The last frame stays visible once playback ends.
    pub fn finish(self) -> Result<EmbeddedAnimation> {
        let count = self.frames.len();
        let mut svg = self.header;
        for (idx, body) in self.frames.iter().enumerate() {
            let begin = idx as u64 * self.interval_ms as u64;
            let fill = if idx + 1 == count { " fill=\"freeze\"" } else { "" };
            writeln!(
                svg,
                "<g visibility=\"hidden\"><set attributeName=\"visibility\" to=\"visible\" \
                 begin=\"{}ms\" dur=\"{}ms\"{}/>{}</g>",
                begin, self.interval_ms, fill, body
            )?;
        }
        svg.push_str("</svg>\n");
        Ok(EmbeddedAnimation { svg, frames: count })
    }
}

impl FrameSink for SvgWriter {
    fn write_frame(&mut self, _index: usize, scene: &Scene) -> Result<()> {
        let mut body = String::new();
        scene.write_markers(&mut body)?;
        self.frames.push(body);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::{ClockTime, Layout};
    use crate::math::Point2d;
    use crate::render::AnimationParams;
    use crate::Scenario;

    fn scene() -> Scene {
        Scene::new(&Scenario::new(300.0, vec![100.0]), &AnimationParams::default())
    }

    #[test]
    fn static_markings_are_written_once() {
        let mut scene = scene();
        let mut writer = SvgWriter::new(&scene, 100).unwrap();
        for i in 0..3 {
            scene.update(Layout {
                clock: ClockTime::from_millis(i * 1000),
                ..Default::default()
            });
            writer.write_frame(i as usize, &scene).unwrap();
        }
        let animation = writer.finish().unwrap();
        let svg = animation.as_svg();

        assert_eq!(animation.frames(), 3);
        assert_eq!(svg.matches("stroke-width=\"7\"").count(), 7);
        assert_eq!(svg.matches("stroke-dasharray").count(), 4);
        assert_eq!(svg.matches("<set ").count(), 3);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn frames_are_scheduled_in_order() {
        let mut scene = scene();
        let mut writer = SvgWriter::new(&scene, 100).unwrap();
        for i in 0..3u64 {
            scene.update(Layout {
                clock: ClockTime::from_millis(i * 1000),
                vehicles_up: vec![Point2d::new(10.0 * i as f64, 0.075)],
                ..Default::default()
            });
            writer.write_frame(i as usize, &scene).unwrap();
        }
        let svg = writer.finish().unwrap().svg;

        let first = svg.find("begin=\"0ms\"").unwrap();
        let second = svg.find("begin=\"100ms\"").unwrap();
        let third = svg.find("begin=\"200ms\"").unwrap();
        assert!(first < second && second < third);
        assert!(svg.find("00h00m00s").unwrap() < svg.find("00h00m02s").unwrap());
        assert_eq!(svg.matches("fill=\"freeze\"").count(), 1);
        assert!(svg[third..].contains("fill=\"freeze\""));
        assert_eq!(svg.matches("<polygon").count(), 3);
    }

    #[test]
    fn html_wrapper() {
        let scene = scene();
        let animation = SvgWriter::new(&scene, 100).unwrap().finish().unwrap();
        let html = animation.to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(animation.as_svg()));
    }
}
