//! Batch cache benchmark.
//!
//! Draws the same 5000 outlined circles first by re-tessellating them
//! every frame, then from a cached batch, with the measured FPS on screen
//! so the difference is visible. Press any key to switch phases.

use std::time::Duration;

use easel::{color, Canvas, WaitResult, WindowConfig};

const N: usize = 5000;

struct Circle {
    x: f32,
    y: f32,
    r: f32,
    color: usize,
}

/// splitmix64; good enough for scattering circles, and keeps the demo
/// free of dependencies.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn draw_circles(canvas: &mut Canvas, circles: &[Circle]) {
    canvas.set_thickness(10.0);
    canvas.set_fill_color(color::TRANSPARENT);
    for c in circles {
        canvas.set_color(color::PALETTE[c.color]);
        canvas.circle(c.x, c.y, c.r);
    }
}

fn draw_legend(canvas: &mut Canvas, batched: bool) {
    canvas.set_thickness(0.0);
    canvas.set_fill_color(color::BLACK);
    canvas.rectangle(0.0, 0.0, 475.0, 130.0);
    canvas.set_color(color::WHITE);
    canvas.text_sized(20.0, 10.0, 25.0, &format!("{N} circles (~{} triangles)", 60 * N));
    canvas.text_sized(20.0, 50.0, 25.0, &format!("FPS: {:.1}", canvas.measured_fps()));
    canvas.text_sized(
        20.0,
        90.0,
        25.0,
        if batched { "using batches" } else { "not using batches (press a key)" },
    );
}

fn draw_mouse_circle(canvas: &mut Canvas) {
    if let Some((mx, my)) = canvas.mouse_position() {
        canvas.set_fill_color(color::BLACK);
        canvas.set_thickness(0.0);
        canvas.circle(mx, my, 50.0);
    }
}

fn main() -> anyhow::Result<()> {
    let mut canvas = Canvas::open(WindowConfig::new("Batches test", 800.0, 450.0))?;

    let mut rng = Rng(0x0DDB_1A5E_5BAD_5EED);
    let circles: Vec<Circle> = (0..N)
        .map(|_| Circle {
            x: rng.below(800) as f32,
            y: rng.below(450) as f32,
            r: rng.below(100) as f32,
            color: 1 + rng.below(15) as usize,
        })
        .collect();

    // Phase 1: tessellate every circle in every frame.
    loop {
        canvas.clear();
        draw_circles(&mut canvas, &circles);
        draw_legend(&mut canvas, false);
        draw_mouse_circle(&mut canvas);
        match canvas.wait_for_input(Some(Duration::ZERO)) {
            WaitResult::TimedOut => {}
            WaitResult::Closed => return Ok(()),
            WaitResult::Input(_) => break,
        }
    }

    // Phase 2: tessellate once into a batch, replay it each frame.
    canvas.begin_batch("circles");
    draw_circles(&mut canvas, &circles);
    canvas.end_batch();
    drop(circles);

    while canvas.refresh() {
        canvas.clear();
        canvas.draw_batch("circles", 0.0, 0.0);
        draw_legend(&mut canvas, true);
        draw_mouse_circle(&mut canvas);
    }

    Ok(())
}
