use ratatui::style::Color;

/// Runtime theme colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey0: Color,
    pub grey2: Color,

    // Semantic colors
    pub accent: Color,
    pub anchor: Color,
    pub border: Color,
    pub current_tick: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            anchor: Color::Rgb(0xd8, 0xa6, 0x57),
            border: Color::Rgb(0x7d, 0xae, 0xa3),
            current_tick: Color::Rgb(0xe7, 0x8a, 0x4e),
            warning: Color::Rgb(0xea, 0x69, 0x62),
        }
    }
}

impl Theme {
    /// Blend `color` toward `bg0` by `opacity` in [0, 1]
    ///
    /// Terminals have no alpha; fading over the background is the closest
    /// match. Non-RGB colors are returned unchanged.
    pub fn fade(&self, color: Color, opacity: f64) -> Color {
        let t = opacity.clamp(0.0, 1.0);
        match (color, self.bg0) {
            (Color::Rgb(r, g, b), Color::Rgb(br, bg, bb)) => {
                let mix = |c: u8, base: u8| (base as f64 + (c as f64 - base as f64) * t).round() as u8;
                Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
            }
            _ => color,
        }
    }
}
