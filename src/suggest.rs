//! CSS and layout suggestions derived from the palette
//!
//! Pure functions: the same palette always yields the same text.

use crate::color::Swatch;

/// Alpha suffix appended to the shadow color (0x66 = 40%)
const SHADOW_ALPHA: &str = "66";

/// A copyable CSS rule built from the first three palette colors.
///
/// Returns an empty string when fewer than three colors are available.
pub fn css_snippet(palette: &[Swatch]) -> String {
    let [first, second, third] = match palette {
        [a, b, c, ..] => [a.hex(), b.hex(), c.hex()],
        _ => return String::new(),
    };

    format!(
        ".lumacraft-card {{\n\
         \x20 background: linear-gradient(135deg, {first} 0%, {second} 50%, {third} 100%);\n\
         \x20 color: #FFFFFF;\n\
         \x20 box-shadow: 0 18px 40px {first}{SHADOW_ALPHA};\n\
         \x20 border-radius: 24px;\n\
         \x20 padding: 32px;\n\
         }}"
    )
}

/// Three layout ideas parameterized by the palette, or none for an empty palette
pub fn layout_ideas(palette: &[Swatch]) -> Vec<String> {
    let Some(primary) = palette.first() else {
        return Vec::new();
    };
    let accent = palette.get(1).unwrap_or(primary);
    let subtle = palette.last().unwrap_or(primary);

    vec![
        format!("Hero banner on a {primary} background with {accent} call-to-action buttons."),
        format!("Card grid on a light surface using {accent} for headings and {subtle} for borders."),
        format!("Footer band in {subtle} with {primary} links to close the page."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Swatch = Swatch::new(255, 0, 0);
    const GREEN: Swatch = Swatch::new(0, 255, 0);
    const BLUE: Swatch = Swatch::new(0, 0, 255);
    const GRAY: Swatch = Swatch::new(128, 128, 128);

    #[test]
    fn test_css_needs_three_colors() {
        assert!(css_snippet(&[]).is_empty());
        assert!(css_snippet(&[RED]).is_empty());
        assert!(css_snippet(&[RED, GREEN]).is_empty());
    }

    #[test]
    fn test_css_uses_first_three_colors() {
        let css = css_snippet(&[RED, GREEN, BLUE, GRAY]);
        assert!(css.starts_with(".lumacraft-card {\n  background: linear-gradient(135deg, #FF0000 0%, #00FF00 50%, #0000FF 100%);"));
        assert!(css.contains("  box-shadow: 0 18px 40px #FF000066;\n"));
        assert!(css.contains("  border-radius: 24px;\n  padding: 32px;\n}"));
        assert!(!css.contains("#808080"));
    }

    #[test]
    fn test_css_is_deterministic() {
        let palette = [BLUE, GRAY, RED];
        assert_eq!(css_snippet(&palette), css_snippet(&palette));
    }

    #[test]
    fn test_layout_ideas_empty_palette() {
        assert!(layout_ideas(&[]).is_empty());
    }

    #[test]
    fn test_layout_ideas_single_color_falls_back_to_primary() {
        let ideas = layout_ideas(&[RED]);
        assert_eq!(ideas.len(), 3);
        assert_eq!(
            ideas[0],
            "Hero banner on a #FF0000 background with #FF0000 call-to-action buttons."
        );
        assert!(ideas[2].starts_with("Footer band in #FF0000"));
    }

    #[test]
    fn test_layout_ideas_roles() {
        let ideas = layout_ideas(&[RED, GREEN, BLUE, GRAY]);
        assert!(ideas[1].contains("#00FF00 for headings"));
        assert!(ideas[1].contains("#808080 for borders"));
        assert!(ideas[2].contains("#FF0000 links"));
    }
}
