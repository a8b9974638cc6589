use plotters::style::RGBColor;

pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // blue
    RGBColor(255, 127, 14),  // orange
    RGBColor(44, 160, 44),   // green
    RGBColor(214, 39, 40),   // red
    RGBColor(148, 103, 189), // purple
    RGBColor(140, 86, 75),   // brown
    RGBColor(227, 119, 194), // pink
    RGBColor(127, 127, 127), // gray
    RGBColor(188, 189, 34),  // olive
    RGBColor(23, 190, 207),  // cyan
];

pub const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

pub const SET3: [RGBColor; 8] = [
    RGBColor(141, 211, 199),
    RGBColor(255, 255, 179),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
];

// dark to light
pub const BLUES: [RGBColor; 6] = [
    RGBColor(8, 48, 107),
    RGBColor(8, 81, 156),
    RGBColor(33, 113, 181),
    RGBColor(66, 146, 198),
    RGBColor(107, 174, 214),
    RGBColor(158, 202, 225),
];

pub const GREEN: RGBColor = RGBColor(0, 128, 0);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const CRIMSON: RGBColor = RGBColor(220, 20, 60);
pub const REGRESSION_RED: RGBColor = RGBColor(255, 0, 0);
pub const SWARM_INK: RGBColor = RGBColor(40, 40, 40);

pub fn pick(palette: &[RGBColor], index: usize) -> RGBColor {
    palette[index % palette.len()]
}

/// Blends `color` toward white by `amount` in [0, 1].
pub fn lighten(color: RGBColor, amount: f64) -> RGBColor {
    let t = amount.clamp(0.0, 1.0);
    let blend = |c: u8| (c as f64 + (255.0 - c as f64) * t).round() as u8;
    RGBColor(blend(color.0), blend(color.1), blend(color.2))
}
