//! The module that paints the status lines and the console window with egui.

use bevy::color::Srgba;
use bevy::prelude::*;
use bevy_egui::egui::text::LayoutJob;
use bevy_egui::*;

use crate::StatusDraws;
use crate::config::ConsoleConfig;
use crate::core::{Console, Justification, TextDraw};

/// Distance between the overlay and the screen edges.
pub const STATUS_MARGIN: f32 = 8.0;
/// Offset of the drop shadow behind status text.
pub const SHADOW_OFFSET: egui::Vec2 = egui::vec2(1.0, 1.0);
/// Text drawn at the edit cursor.
pub const CURSOR: &str = "_";

/// Convert a bevy color to an egui color.
pub fn to_color32(color: Srgba) -> egui::Color32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(
        channel(color.red),
        channel(color.green),
        channel(color.blue),
        channel(color.alpha),
    )
}

fn paint_draw(painter: &egui::Painter, draw: &TextDraw, pos: egui::Pos2, font: &egui::FontId) -> f32 {
    let anchor = match draw.justification {
        Justification::Left => egui::Align2::LEFT_TOP,
        Justification::Right => egui::Align2::RIGHT_TOP,
    };
    painter.text(
        pos + SHADOW_OFFSET,
        anchor,
        &draw.text,
        font.clone(),
        to_color32(draw.shadow),
    );
    painter
        .text(pos, anchor, &draw.text, font.clone(), to_color32(draw.color))
        .height()
}

/// System that paints this frame's [`StatusDraws`] above everything else.
///
/// Left-justified batches stack down the left edge, the rest down the right.
pub(crate) fn paint_status_lines(
    mut contexts: EguiContexts,
    draws: Res<StatusDraws>,
    config: Res<ConsoleConfig>,
) -> Result<(), BevyError> {
    if draws.is_empty() {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    let screen = ctx.screen_rect().shrink(STATUS_MARGIN);
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("status_lines"),
    ));
    let font = egui::FontId::monospace(config.font_size);

    let mut left = screen.left_top();
    let mut right = screen.right_top();
    for draw in draws.iter() {
        let pos = match draw.justification {
            Justification::Left => &mut left,
            Justification::Right => &mut right,
        };
        pos.y += paint_draw(&painter, draw, *pos, &font);
    }
    Ok(())
}

pub(crate) fn render_console_system(
    mut contexts: EguiContexts,
    console: NonSend<Console>,
) -> Result<(), BevyError> {
    egui::Window::new("Developer Console")
        .collapsible(false)
        .default_width(900.)
        .show(contexts.ctx_mut()?, |ui| render_console(ui, &console));
    Ok(())
}

/// The function that renders the scrollback and the prompt line.
pub fn render_console(ui: &mut egui::Ui, console: &Console) {
    let config = console.config();
    let font = egui::FontId::monospace(config.font_size);

    egui::TopBottomPanel::bottom("prompt panel")
        .frame(egui::Frame::NONE.outer_margin(egui::Margin::symmetric(5, 5)))
        .show_inside(ui, |ui| {
            ui.label(prompt_line(console, &font));
        });

    egui::ScrollArea::new([false, true])
        .auto_shrink([false, true])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                for line in console.output().lines() {
                    ui.label(
                        egui::RichText::new(&line.text)
                            .font(font.clone())
                            .color(to_color32(line.color)),
                    );
                }
            });
        });
}

fn prompt_line(console: &Console, font: &egui::FontId) -> LayoutJob {
    let config = console.config();
    let format = egui::TextFormat::simple(font.clone(), to_color32(config.input_color));

    let mut text = LayoutJob::default();
    text.append(&config.prompt, 0.0, format.clone());
    text.append(console.line().text(), 0.0, format.clone());
    text.append(CURSOR, 0.0, format);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_color32() {
        assert_eq!(to_color32(Srgba::WHITE), egui::Color32::WHITE);
        assert_eq!(
            to_color32(Srgba::new(1.0, 0.0, 0.0, 1.0)),
            egui::Color32::from_rgb(255, 0, 0)
        );
        // out of range channels are clamped
        assert_eq!(
            to_color32(Srgba::new(2.0, -1.0, 0.0, 1.0)),
            egui::Color32::from_rgb(255, 0, 0)
        );
    }
}
