//! Visualization utilities for fillet_rrt
//!
//! Plots the north/east projection of a plan with gnuplot: east on the
//! horizontal axis, north on the vertical one.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Cylinder, PlannerError, PlannerResult, Position};
use crate::path_planning::fillet::Fillet;
use crate::path_planning::forest::Forest;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00AA00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#AAAAAA";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const BOUNDARY: &str = ORANGE;
    pub const START: &str = GREEN;
    pub const WAYPOINT: &str = BLUE;
    pub const ROUTE: &str = RED;
    pub const TREE: &str = GRAY;
}

/// Style for line rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: Option<String>,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: Some(caption.to_string()),
        }
    }

    /// Style without a legend entry
    pub fn plain(color: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 1.0,
            caption: None,
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::ROUTE, "Route")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Collects layers and renders them into a single gnuplot axes
pub struct Visualizer {
    title: String,
    x_label: String,
    y_label: String,
    aspect_ratio: Option<f64>,
    layers: Vec<Layer>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            x_label: "East [m]".to_string(),
            y_label: "North [m]".to_string(),
            aspect_ratio: Some(1.0),
            layers: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn plot_polyline(&mut self, points: &[Position], style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: points.iter().map(|p| p.e).collect(),
            y: points.iter().map(|p| p.n).collect(),
            style: style.clone(),
        });
        self
    }

    pub fn plot_points(&mut self, points: &[Position], style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.e).collect(),
            y: points.iter().map(|p| p.n).collect(),
            style: style.clone(),
        });
        self
    }

    /// Closed boundary polygon
    pub fn plot_boundary(&mut self, boundary: &[Position]) -> &mut Self {
        if let Some(first) = boundary.first() {
            let mut closed = boundary.to_vec();
            closed.push(*first);
            self.plot_polyline(&closed, &PathStyle::new(colors::BOUNDARY, "Boundary"));
        }
        self
    }

    /// Cylinder footprints as circles
    pub fn plot_cylinders(&mut self, cylinders: &[Cylinder]) -> &mut Self {
        for cyl in cylinders {
            let outline: Vec<Position> = (0..=36)
                .map(|i| {
                    let a = i as f64 * std::f64::consts::PI / 18.0;
                    Position::new(cyl.n + cyl.radius * a.cos(), cyl.e + cyl.radius * a.sin(), 0.0)
                })
                .collect();
            self.plot_polyline(&outline, &PathStyle::plain(colors::OBSTACLE).with_line_width(2.0));
        }
        self
    }

    /// Every edge of the forest, with fillet arcs where a node stores one
    pub fn plot_forest(&mut self, forest: &Forest) -> &mut Self {
        let style = PathStyle::plain(colors::TREE);
        for (_, node) in forest.nodes() {
            if let Some(parent) = node.parent() {
                self.plot_polyline(&[forest.position(parent), node.position()], &style);
            }
            if let Some(fillet) = node.fillet() {
                self.plot_fillet(fillet);
            }
        }
        self
    }

    pub fn plot_fillet(&mut self, fillet: &Fillet) -> &mut Self {
        self.plot_polyline(&fillet.arc_points(0.1), &PathStyle::plain(colors::GREEN))
    }

    pub fn plot_route(&mut self, route: &[Position]) -> &mut Self {
        self.plot_polyline(route, &PathStyle::default().with_line_width(3.0))
    }

    pub fn plot_start(&mut self, point: Position) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn plot_waypoints(&mut self, waypoints: &[Position]) -> &mut Self {
        self.plot_points(
            waypoints,
            &PointStyle::new(colors::WAYPOINT, "Waypoints").with_size(1.5).with_symbol('S'),
        )
    }

    /// Finalize and show the plot
    pub fn show(&self) -> PlannerResult<()> {
        let mut figure = self.render();
        figure
            .show()
            .map(|_| ())
            .map_err(|e| PlannerError::Visualization(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> PlannerResult<()> {
        let mut figure = self.render();
        figure
            .save_to_png(path, width, height)
            .map_err(|e| PlannerError::Visualization(e.to_string()))
    }

    /// Save plot to SVG file
    pub fn save_svg(&self, path: &str) -> PlannerResult<()> {
        let mut figure = self.render();
        figure
            .save_to_svg(path, 800, 600)
            .map_err(|e| PlannerError::Visualization(e.to_string()))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    let mut options = vec![Color(style.color.as_str()), LineWidth(style.line_width)];
                    if let Some(caption) = &style.caption {
                        options.push(Caption(caption.as_str()));
                    }
                    axes.lines(x, y, &options);
                }
                Layer::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(style.caption.as_str()),
                        Color(style.color.as_str()),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
