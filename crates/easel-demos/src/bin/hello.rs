//! Classic first program: a face drawn from circles and a rectangle.

use easel::{color, Canvas, Color, WindowConfig};

fn main() -> anyhow::Result<()> {
    let mut canvas = Canvas::open(WindowConfig::new("HELLO WORLD", 800.0, 800.0))?;
    canvas.set_background_color(Color::rgb(0.9, 0.9, 0.9));
    canvas.clear();

    canvas.set_color(color::BLACK);
    canvas.set_thickness(2.0);
    canvas.set_fill_color(color::YELLOW);
    canvas.circle(400.0, 400.0, 300.0);

    canvas.set_color(color::BLACK);
    canvas.set_fill_color(color::YELLOW);
    canvas.set_thickness(15.0);
    canvas.circle(400.0, 400.0, 200.0);
    canvas.set_color(color::YELLOW);
    canvas.rectangle(180.0, 200.0, 440.0, 250.0);

    canvas.set_color(color::BLACK);
    canvas.set_fill_color(color::BLACK);
    canvas.circle(320.0, 300.0, 30.0);
    canvas.circle(480.0, 300.0, 30.0);

    canvas.wait_until_closed();
    Ok(())
}
