//! Palette strip
//!
//! Draws the extracted palette as equal-width tiles with their hex codes.
//! Clicking a tile copies that color.
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use lumacraft::Swatch;

use crate::Message;

/// Gap between tiles in logical pixels
const GAP: f32 = 8.0;
/// Height reserved under each tile for the hex label
const LABEL_HEIGHT: f32 = 22.0;

#[derive(Debug, Clone)]
pub struct SwatchStrip {
    pub colors: Vec<Swatch>,
}

impl SwatchStrip {
    pub fn new(colors: &[Swatch]) -> Self {
        Self {
            colors: colors.to_vec(),
        }
    }
}

/// Hover state for the strip
#[derive(Debug, Clone, Default)]
pub struct StripState {
    hovered: Option<usize>,
}

impl canvas::Program<Message> for SwatchStrip {
    type State = StripState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        if self.colors.is_empty() {
            return vec![frame.into_geometry()];
        }

        let tile_width = tile_width(bounds.width, self.colors.len());
        let tile_height = (bounds.height - LABEL_HEIGHT).max(1.0);
        let label_color = theme.palette().text;

        for (i, swatch) in self.colors.iter().enumerate() {
            let x = i as f32 * (tile_width + GAP);
            let tile = Path::rectangle(Point::new(x, 0.0), Size::new(tile_width, tile_height));
            frame.fill(&tile, Color::from_rgb8(swatch.r, swatch.g, swatch.b));

            if state.hovered == Some(i) {
                frame.stroke(&tile, Stroke::default().with_color(label_color).with_width(2.0));
            }

            frame.fill_text(canvas::Text {
                content: swatch.hex(),
                position: Point::new(x + 2.0, tile_height + 4.0),
                color: label_color,
                size: 14.0.into(),
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let hit = cursor
            .position_in(bounds)
            .and_then(|pos| swatch_at(bounds.width, self.colors.len(), pos.x));

        match event {
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                state.hovered = hit;
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(index) = hit {
                    let hex = self.colors[index].hex();
                    return (canvas::event::Status::Captured, Some(Message::CopyHex(hex)));
                }
            }
            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> mouse::Interaction {
        if state.hovered.is_some() {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

fn tile_width(total: f32, count: usize) -> f32 {
    let gaps = GAP * count.saturating_sub(1) as f32;
    ((total - gaps) / count.max(1) as f32).max(1.0)
}

/// Index of the tile under `x`, or `None` over a gap or past the end
fn swatch_at(total: f32, count: usize, x: f32) -> Option<usize> {
    if count == 0 || x < 0.0 {
        return None;
    }
    let width = tile_width(total, count);
    let index = (x / (width + GAP)) as usize;
    let within = x - index as f32 * (width + GAP);
    (index < count && within <= width).then_some(index)
}
