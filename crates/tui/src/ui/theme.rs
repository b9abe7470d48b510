use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub positive: Color,
    pub error: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(95, 160, 135),
            positive: Color::Rgb(120, 190, 120),
            error: Color::Rgb(205, 90, 90),
            border: Color::Rgb(70, 78, 86),
        }
    }
}
