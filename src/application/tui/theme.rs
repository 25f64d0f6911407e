use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub header: Color,
    pub weekend: Color,
    pub focused: Color,
    pub dimmed: Color,
    pub today: Color,
    pub focused_week_bg: Color,
    pub cursor_bg: Color,

    // Booking state
    pub selected: Color,
    pub selected_bg: Color,
    pub blocked: Color,

    pub notice: Color,
    pub total: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            colors: ThemeColors {
                header: Color::Cyan,
                weekend: Color::Rgb(150, 150, 150),
                focused: Color::White,
                dimmed: Color::DarkGray,
                today: Color::Yellow,
                focused_week_bg: Color::Rgb(28, 28, 28),
                cursor_bg: Color::Rgb(60, 60, 60),
                selected: Color::Black,
                selected_bg: Color::LightBlue,
                blocked: Color::Red,
                notice: Color::LightYellow,
                total: Color::LightGreen,
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            colors: ThemeColors {
                header: Color::Blue,
                weekend: Color::Gray,
                focused: Color::Black,
                dimmed: Color::Gray,
                today: Color::Magenta,
                focused_week_bg: Color::Rgb(240, 240, 240),
                cursor_bg: Color::Rgb(215, 215, 215),
                selected: Color::White,
                selected_bg: Color::Blue,
                blocked: Color::Red,
                notice: Color::Rgb(160, 90, 0),
                total: Color::Green,
            },
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(), // default
        }
    }

    pub fn blocked_style(&self) -> Style {
        Style::default()
            .fg(self.colors.blocked)
            .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.colors.selected)
            .bg(self.colors.selected_bg)
    }
}
