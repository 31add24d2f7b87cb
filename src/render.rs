use crate::landmarks::{self, CONNECTIONS, Landmark, LandmarkSet};
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use image::{Rgb, RgbImage};
use line_drawing::Bresenham;
use std::path::PathBuf;

const JOINT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const JOINT_RADIUS: i32 = 2;

pub fn run(landmarks: &PathBuf, output: &PathBuf, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("canvas must be at least 1x1, got {width}x{height}");
    }

    let Some(set) = landmarks::load(landmarks)? else {
        bail!("no pose detected in {}", landmarks.display());
    };

    let canvas = draw_skeleton(&set, width, height);

    // Save the buffer of RGB pixels, format taken from the file extension.
    image::save_buffer(
        output,
        &canvas,
        width,
        height,
        image::ExtendedColorType::Rgb8,
    )
    .with_context(|| format!("failed to write {}", output.display()))?;

    log::info!("drew {} landmarks to {}", set.len(), output.display());
    Ok(())
}

/// Stick figure of `set` on a black canvas.
///
/// Bones are coloured by the weaker visibility of their two ends, so shaky
/// detections stand out. Landmarks with non-finite coordinates are skipped.
pub fn draw_skeleton(set: &LandmarkSet, width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return canvas;
    }
    let points = set.points();

    for (a, b) in CONNECTIONS {
        let (Some(a), Some(b)) = (points.get(a.index()), points.get(b.index())) else {
            continue;
        };
        let (Some(from), Some(to)) = (to_pixel(a, width, height), to_pixel(b, width, height))
        else {
            continue;
        };
        let Some((from, to)) = clip_segment(from, to, width, height) else {
            continue;
        };
        let color = Rgb(to_rgb(a.visibility.min(b.visibility)));
        for (x, y) in Bresenham::new(from, to) {
            put(&mut canvas, x, y, color);
        }
    }

    let reach = f64::from(JOINT_RADIUS);
    let near = |v: f64, size: u32| (-reach..=f64::from(size) + reach).contains(&v);
    for landmark in points {
        let Some((x, y)) = to_pixel(landmark, width, height) else {
            continue;
        };
        if !near(x, width) || !near(y, height) {
            continue;
        }
        let (cx, cy) = (x.round() as i32, y.round() as i32);
        for dy in -JOINT_RADIUS..=JOINT_RADIUS {
            for dx in -JOINT_RADIUS..=JOINT_RADIUS {
                if dx * dx + dy * dy <= JOINT_RADIUS * JOINT_RADIUS {
                    put(&mut canvas, cx + dx, cy + dy, JOINT_COLOR);
                }
            }
        }
    }

    canvas
}

fn to_pixel(landmark: &Landmark, width: u32, height: u32) -> Option<(f64, f64)> {
    if !landmark.is_finite() {
        return None;
    }
    Some((landmark.x * f64::from(width), landmark.y * f64::from(height)))
}

/// Cut the segment down to the part inside the canvas (Liang-Barsky).
///
/// The line iterator then only walks pixels that can be drawn, however far
/// off the canvas a landmark lies. Canvas must be at least 1x1.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    width: u32,
    height: u32,
) -> Option<((i32, i32), (i32, i32))> {
    let x_max = f64::from(width - 1);
    let y_max = f64::from(height - 1);
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t_in, mut t_out) = (0_f64, 1_f64);

    for (p, q) in [
        (-dx, from.0),
        (dx, x_max - from.0),
        (-dy, from.1),
        (dy, y_max - from.1),
    ] {
        if p == 0. {
            // Parallel to this edge and outside it.
            if q < 0. {
                return None;
            }
        } else if p < 0. {
            t_in = t_in.max(q / p);
        } else {
            t_out = t_out.min(q / p);
        }
    }
    if t_in > t_out {
        return None;
    }

    let at = |t: f64| {
        let x = (from.0 + t * dx).round().clamp(0., x_max);
        let y = (from.1 + t * dy).round().clamp(0., y_max);
        (x as i32, y as i32)
    };
    Some((at(t_in), at(t_out)))
}

fn put(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, color);
    }
}

/// Map a visibility in [0, 1] onto a blue to red ramp. Values outside are clamped.
pub fn to_rgb(visibility: f64) -> [u8; 3] {
    let x = if visibility.is_nan() { 0. } else { visibility.clamp(0., 1.) };
    let x_norm = (x * 255.).floor() as u8;

    // Each channel rises then falls, four steps per unit.
    let ramp = |up: u8, down: u8| {
        let rise = x_norm.saturating_sub(up).saturating_mul(4);
        let fall = 255 - x_norm.saturating_sub(down).saturating_mul(4);
        rise.min(fall)
    };
    let r = ramp(96, 224);
    let g = ramp(32, 160);
    let b = x_norm
        .saturating_add(127)
        .saturating_mul(4)
        .min(255 - x_norm.saturating_sub(96).saturating_mul(4));

    [r, g, b]
}
