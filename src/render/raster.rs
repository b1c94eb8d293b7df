//! Rasterization of scene markup with resvg.

use super::Scene;
use crate::error::{Error, Result};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// Renders frames of a scene to RGBA pixmaps.
///
/// The road markings are rendered once; each frame draws its markers over a
/// copy of them.
pub struct Rasterizer {
    options: Options<'static>,
    background: Pixmap,
}

impl Rasterizer {
    /// Loads the system fonts and renders the static markings of `scene`.
    pub fn new(scene: &Scene) -> Result<Self> {
        let (width, height) = scene.size();
        let mut background = Pixmap::new(width, height).ok_or(Error::Canvas { width, height })?;

        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        log::debug!("Loaded {} font faces", options.fontdb.len());

        let mut markup = String::new();
        scene.write_open(&mut markup)?;
        scene.write_markings(&mut markup)?;
        markup.push_str("</svg>\n");
        draw(&markup, &options, &mut background)?;

        Ok(Self {
            options,
            background,
        })
    }

    /// Renders the current frame of `scene`.
    pub fn frame(&self, scene: &Scene) -> Result<Pixmap> {
        let mut pixmap = self.background.clone();
        let mut markup = String::new();
        scene.write_open(&mut markup)?;
        scene.write_markers(&mut markup)?;
        markup.push_str("</svg>\n");
        draw(&markup, &self.options, &mut pixmap)?;
        Ok(pixmap)
    }
}

fn draw(markup: &str, options: &Options, pixmap: &mut Pixmap) -> Result<()> {
    let tree = Tree::from_str(markup, options)?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    Ok(())
}
