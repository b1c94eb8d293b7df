//! The persistent visual state of an animation.
//!
//! The road markings are computed once when the scene is created. Each frame
//! only replaces the marker positions and the clock label. Both are emitted as
//! SVG markup, which the frame sinks either embed or rasterize.

use super::AnimationParams;
use crate::layout::Layout;
use crate::math::{arange, linspace, Point2d};
use crate::util::Interval;
use crate::Scenario;
use itertools::Itertools;
use std::fmt::{self, Write};

/// Spacing of the grid lines along the road, in m.
const GRID_SPACING: f64 = 100.0;

/// The fractions of the image occupied by the plot area,
/// measured from the left and from the top.
const PLOT_X: Interval<f64> = Interval::new(0.125, 0.9);
const PLOT_Y: Interval<f64> = Interval::new(0.12, 0.89);

/// Marker sizes in pixels.
const PEDESTRIAN_RADIUS: f64 = 6.0;
const VEHICLE_HALF_SIZE: f64 = 3.5;
const STRIPE_THICKNESS: f64 = 7.0;
const FONT_SIZE: f64 = 16.0;

const PEDESTRIAN_COLOR: &str = "dodgerblue";
const UP_COLOR: &str = "firebrick";
const DOWN_COLOR: &str = "purple";

/// Maps diagram coordinates onto image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// The visible range along the road.
    pub x: Interval<f64>,
    /// The visible vertical range.
    pub y: Interval<f64>,
    /// The horizontal pixel range of the plot area.
    px_x: Interval<f64>,
    /// The vertical pixel range of the plot area, bottom to top.
    px_y: Interval<f64>,
}

impl Viewport {
    fn new(road_length: f64, width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self {
            x: Interval::new(0.0, road_length + 1.0),
            y: Interval::new(-1.0, 1.0),
            px_x: Interval::new(PLOT_X.min * w, PLOT_X.max * w),
            px_y: Interval::new(PLOT_Y.max * h, PLOT_Y.min * h),
        }
    }

    /// Converts a point on the diagram to pixel coordinates.
    pub fn to_pixel(&self, point: Point2d) -> Point2d {
        Point2d::new(
            self.x.map_to(&self.px_x, point.x),
            self.y.map_to(&self.px_y, point.y),
        )
    }

    /// Whether a point on the diagram is inside the plot area.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}

/// One stripe of a zebra crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stripe {
    /// The extent of the stripe along the road.
    pub x: Interval<f64>,
    /// The vertical position of the stripe.
    pub y: f64,
}

/// The road diagram, with static markings and the current frame's markers.
#[derive(Clone, Debug)]
pub struct Scene {
    width: u32,
    height: u32,
    viewport: Viewport,
    grid_lines: Vec<f64>,
    stripes: Vec<Stripe>,
    frame: Layout,
}

impl Scene {
    /// Creates the scene and lays out the road markings.
    pub fn new(scenario: &Scenario, params: &AnimationParams) -> Self {
        let viewport = Viewport::new(scenario.road_length, params.width, params.height);
        let grid_lines = arange(viewport.x.max, GRID_SPACING).collect();
        let half_height = params.layout.width;
        let stripes = scenario
            .zebra_crossings
            .iter()
            .flat_map(|&crossing| {
                let x = Interval::disc(crossing, 0.5 * params.length);
                linspace(-half_height, half_height, params.n_stripes).map(move |y| Stripe { x, y })
            })
            .collect();

        Self {
            width: params.width,
            height: params.height,
            viewport,
            grid_lines,
            stripes,
            frame: Layout::default(),
        }
    }

    /// The image size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The positions of the grid lines along the road.
    pub fn grid_lines(&self) -> &[f64] {
        &self.grid_lines
    }

    /// The stripes of every zebra crossing.
    pub fn stripes(&self) -> &[Stripe] {
        &self.stripes
    }

    /// The marker positions of the current frame.
    pub fn frame(&self) -> &Layout {
        &self.frame
    }

    /// The clock label of the current frame.
    pub fn label(&self) -> String {
        format!("Time: {}", self.frame.clock)
    }

    /// Replaces the markers with those of the next frame.
    pub fn update(&mut self, layout: Layout) {
        self.frame = layout;
    }

    /// Writes the opening `<svg>` tag.
    pub fn write_open(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = self.width,
            h = self.height
        )
    }

    /// Writes the background, crossing stripes, grid and road axis.
    pub fn write_markings(&self, out: &mut impl Write) -> fmt::Result {
        let viewport = &self.viewport;
        writeln!(out, "<rect width=\"100%\" height=\"100%\" fill=\"white\"/>")?;

        for stripe in &self.stripes {
            let start = viewport.to_pixel(Point2d::new(stripe.x.min, stripe.y));
            let end = viewport.to_pixel(Point2d::new(stripe.x.max, stripe.y));
            writeln!(
                out,
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"black\" stroke-width=\"{}\"/>",
                start.x, start.y, end.x, end.y, STRIPE_THICKNESS
            )?;
        }

        let bottom = viewport.to_pixel(Point2d::new(viewport.x.min, viewport.y.min));
        let top = viewport.to_pixel(Point2d::new(viewport.x.min, viewport.y.max));
        for &x in &self.grid_lines {
            let x = viewport.to_pixel(Point2d::new(x, 0.0)).x;
            writeln!(
                out,
                "<line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"grey\" \
                 stroke-width=\"1\" stroke-dasharray=\"2 2\"/>",
                top.y,
                bottom.y,
                x = x
            )?;
        }

        let right = viewport.to_pixel(Point2d::new(viewport.x.max, viewport.y.min));
        writeln!(
            out,
            "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"black\" stroke-width=\"1\"/>",
            bottom.x,
            right.x,
            y = bottom.y
        )
    }

    /// Writes the pedestrian and vehicle markers and the clock label of the current frame.
    pub fn write_markers(&self, out: &mut impl Write) -> fmt::Result {
        for point in self.visible(&self.frame.pedestrians) {
            write!(
                out,
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" fill=\"{}\"/>",
                point.x, point.y, PEDESTRIAN_RADIUS, PEDESTRIAN_COLOR
            )?;
        }
        for (points, heading, color) in [
            (&self.frame.vehicles_up, 1.0, UP_COLOR),
            (&self.frame.vehicles_down, -1.0, DOWN_COLOR),
        ] {
            for point in self.visible(points) {
                let vertices = arrow(point, heading)
                    .iter()
                    .map(|v| format!("{:.1},{:.1}", v.x, v.y))
                    .join(" ");
                write!(out, "<polygon points=\"{}\" fill=\"{}\"/>", vertices, color)?;
            }
        }

        let origin = self.label_origin();
        write!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"{}\">{}</text>",
            origin.x,
            origin.y,
            FONT_SIZE,
            self.label()
        )
    }

    /// The baseline origin of the clock label in pixels, just above the plot area.
    fn label_origin(&self) -> Point2d {
        let corner = self
            .viewport
            .to_pixel(Point2d::new(self.viewport.x.min, self.viewport.y.max));
        Point2d::new(corner.x, corner.y - 0.5 * FONT_SIZE)
    }

    /// The pixel positions of the points inside the plot area.
    fn visible<'a>(&'a self, points: &'a [Point2d]) -> impl Iterator<Item = Point2d> + 'a {
        points
            .iter()
            .copied()
            .filter(move |point| self.viewport.contains(*point))
            .map(move |point| self.viewport.to_pixel(point))
    }
}

/// The vertices of a triangular vehicle marker in pixels, pointing right
/// (`heading = 1.0`) or left (`heading = -1.0`).
fn arrow(centre: Point2d, heading: f64) -> [Point2d; 3] {
    let s = VEHICLE_HALF_SIZE;
    [
        Point2d::new(centre.x - heading * s, centre.y - s),
        Point2d::new(centre.x - heading * s, centre.y + s),
        Point2d::new(centre.x + heading * s, centre.y),
    ]
}
