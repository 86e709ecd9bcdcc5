use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub table_header_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub sparkline_memory: Color,
    pub sparkline_swap: Color,
    /// Idle, busy, and saturated CPU cells.
    pub heat_colors: [Color; 3],
}

impl Theme {
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "colorblind" => Self::colorblind(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn next(&self) -> Self {
        let next_name = match self.name {
            "dark" => "light",
            "light" => "colorblind",
            "colorblind" => "mono",
            _ => "dark",
        };
        Theme::from_config(next_name)
    }

    /// Color for a CPU cell; thresholds are in percent of total capacity.
    pub fn cpu_color(&self, cpu_percent: f64) -> Color {
        if cpu_percent >= 50.0 {
            self.heat_colors[2]
        } else if cpu_percent >= 10.0 {
            self.heat_colors[1]
        } else {
            self.heat_colors[0]
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            table_header_fg: Color::Yellow,
            selection_bg: Color::Rgb(55, 65, 81),
            selection_fg: Color::White,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Green,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            sparkline_memory: Color::Rgb(103, 232, 249),
            sparkline_swap: Color::Rgb(251, 146, 60),
            heat_colors: [
                Color::Gray,
                Color::Rgb(249, 115, 22),
                Color::Rgb(239, 68, 68),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            table_header_fg: Color::Blue,
            selection_bg: Color::Rgb(200, 220, 240),
            selection_fg: Color::Black,
            status_ok: Color::Rgb(0, 120, 0),
            status_err: Color::Red,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            accent: Color::Blue,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            sparkline_memory: Color::Rgb(70, 130, 180),
            sparkline_swap: Color::Rgb(200, 120, 40),
            heat_colors: [
                Color::DarkGray,
                Color::Rgb(220, 120, 80),
                Color::Rgb(200, 60, 60),
            ],
        }
    }

    pub fn colorblind() -> Self {
        Theme {
            name: "colorblind",
            header_accent_bg: Color::Rgb(0, 114, 178),
            header_accent_fg: Color::White,
            table_header_fg: Color::Rgb(240, 228, 66),
            selection_bg: Color::Rgb(0, 73, 114),
            selection_fg: Color::White,
            status_ok: Color::Rgb(0, 158, 115),
            status_err: Color::Rgb(213, 94, 0),
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::Rgb(86, 180, 233),
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Rgb(86, 180, 233),
            pill_key_bg: Color::Rgb(240, 228, 66),
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            sparkline_memory: Color::Rgb(86, 180, 233),
            sparkline_swap: Color::Rgb(230, 159, 0),
            heat_colors: [
                Color::Gray,
                Color::Rgb(230, 159, 0),
                Color::Rgb(213, 94, 0),
            ],
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            table_header_fg: Color::White,
            selection_bg: Color::Gray,
            selection_fg: Color::Black,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::Gray,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            sparkline_memory: Color::White,
            sparkline_swap: Color::Gray,
            heat_colors: [Color::Gray, Color::White, Color::White],
        }
    }
}
