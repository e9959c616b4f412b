#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
/// Color scheme
pub enum Theme {
    #[default]
    /// `Dark` or `Light`, according to `dark_light`
    Auto,
    /// light on dark
    Dark,
    /// dark on light
    Light,
}

impl Theme {
    /// Built-in iced theme for this scheme
    pub fn to_iced(self) -> iced::Theme {
        match self {
            Self::Dark => iced::Theme::Dark,
            Self::Light => iced::Theme::Light,
            Self::Auto => match dark_light::detect() {
                dark_light::Mode::Light => iced::Theme::Light,
                // If the mode can't be detected, fall back to dark.
                dark_light::Mode::Dark | dark_light::Mode::Default => iced::Theme::Dark,
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Dark => "Dark",
                Self::Light => "Light",
                Self::Auto => "Auto (follow system theme)",
            }
        )
    }
}

pub fn string_to_theme(theme: &str) -> Theme {
    match theme {
        "Dark" => Theme::Dark,
        "Light" => Theme::Light,
        // Auto uses `Display`, so it doesn't have a canonical repr
        t if t.starts_with("Auto") => Theme::Auto,
        _ => Theme::default(),
    }
}
