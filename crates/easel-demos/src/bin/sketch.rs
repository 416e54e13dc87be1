//! Freehand sketching: drag to draw, scroll to change the stroke width,
//! C clears, T types a caption onto the picture.

use easel::{color, Canvas, Key, MouseButton, WindowConfig};

fn main() -> anyhow::Result<()> {
    let mut canvas = Canvas::open(WindowConfig::new("sketch", 1000.0, 700.0))?;
    canvas.set_background_color(color::WHITE);
    canvas.clear();
    canvas.text(10.0, 10.0, "drag: draw   wheel: width   C: clear   T: caption");

    let mut last: Option<(f32, f32)> = None;
    let mut base_wheel = canvas.mouse_wheel();

    while canvas.refresh() {
        let width = (2.0 + (canvas.mouse_wheel() - base_wheel)).clamp(0.5, 40.0) as f32;
        canvas.set_thickness(width);
        canvas.set_color(color::DARK_BLUE);

        if canvas.is_button_down(MouseButton::Left) {
            if let Some((x, y)) = canvas.mouse_position() {
                match last {
                    Some((px, py)) => canvas.line(px, py, x, y),
                    None => canvas.circle(x, y, width * 0.5),
                }
                last = Some((x, y));
            }
        } else {
            last = None;
        }

        if canvas.is_key_down(Key::C) {
            canvas.clear();
            canvas.text(10.0, 10.0, "drag: draw   wheel: width   C: clear   T: caption");
            base_wheel = canvas.mouse_wheel();
        }

        if canvas.is_key_down(Key::T) {
            canvas.set_color(color::BLACK);
            let caption = canvas.read_line(10.0, 660.0, 20.0, true, 0);
            if !caption.is_empty() {
                log::info!("caption: {caption}");
            }
        }
    }

    Ok(())
}
