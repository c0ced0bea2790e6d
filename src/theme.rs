//! Theme data model: built-in palettes and resolution from config.
//!
//! The theme system provides two built-in palettes (dark and light) and
//! supports custom color overrides from the config file.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
///
/// Constructed from a config-level `ThemeConfig` via `resolve_theme()`.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub dir_fg: Color,

    // Selection markers
    pub checked_fg: Color,
    pub partial_fg: Color,
    pub token_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & chrome
    pub border_fg: Color,

    // Dialogs
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic colors (not configurable, consistent across themes)
    pub error_fg: Color,
    pub success_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(205, 214, 244),   // #cdd6f4 (text)
        cursor_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        cursor_fg: Color::Rgb(205, 214, 244), // #cdd6f4
        dir_fg: Color::Rgb(137, 180, 250),    // #89b4fa (blue)

        checked_fg: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
        partial_fg: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
        token_fg: Color::Rgb(108, 112, 134),   // #6c7086 (overlay0)

        status_bg: Color::Rgb(30, 30, 46), // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(88, 91, 112), // #585b70 (surface2)

        dialog_bg: Color::Rgb(49, 50, 68), // #313244 (surface0)
        dialog_border_fg: Color::Rgb(137, 180, 250),

        error_fg: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
        success_fg: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
        accent_fg: Color::Rgb(203, 166, 247),  // #cba6f7 (mauve)
        dim_fg: Color::Rgb(108, 112, 134),     // #6c7086
    }
}

/// Light theme — complementary light palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(76, 79, 105),     // #4c4f69 (text)
        cursor_bg: Color::Rgb(204, 208, 218), // #ccd0da (surface1)
        cursor_fg: Color::Rgb(76, 79, 105),
        dir_fg: Color::Rgb(30, 102, 245), // #1e66f5 (blue)

        checked_fg: Color::Rgb(64, 160, 43),  // #40a02b (green)
        partial_fg: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
        token_fg: Color::Rgb(156, 160, 176),  // #9ca0b0 (overlay0)

        status_bg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)

        dialog_bg: Color::Rgb(230, 233, 239), // #e6e9ef (surface0)
        dialog_border_fg: Color::Rgb(30, 102, 245),

        error_fg: Color::Rgb(210, 15, 57),   // #d20f39 (red)
        success_fg: Color::Rgb(64, 160, 43), // #40a02b (green)
        accent_fg: Color::Rgb(136, 57, 239), // #8839ef (mauve)
        dim_fg: Color::Rgb(156, 160, 176),
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn apply(slot: &mut Color, hex: &Option<String>) {
    if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
        *slot = color;
    }
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// - `"dark"` (default): dark Catppuccin palette
/// - `"light"`: light Catppuccin palette
/// - `"custom"`: start from dark palette, then override with custom hex values
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    let scheme = config.scheme.as_deref().unwrap_or("dark");
    match scheme {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

/// Apply custom hex color overrides on top of an existing theme.
fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    apply(&mut theme.tree_fg, &custom.tree_fg);
    apply(&mut theme.cursor_bg, &custom.cursor_bg);
    apply(&mut theme.cursor_fg, &custom.cursor_fg);
    apply(&mut theme.dir_fg, &custom.dir_fg);
    apply(&mut theme.checked_fg, &custom.checked_fg);
    apply(&mut theme.partial_fg, &custom.partial_fg);
    apply(&mut theme.token_fg, &custom.token_fg);
    apply(&mut theme.status_bg, &custom.status_bg);
    apply(&mut theme.status_fg, &custom.status_fg);
    apply(&mut theme.border_fg, &custom.border_fg);
    apply(&mut theme.dialog_bg, &custom.dialog_bg);
    apply(&mut theme.dialog_border_fg, &custom.dialog_border_fg);
}

// ── Tests ────────────────────────────────────────────────────────────────────
