use nalgebra::Vector3;

/// `hue`, `saturation` and `value` all in `[0, 1]`.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Vector3<f32> {
    let sector = (hue * 6.0).floor();
    let fraction = hue * 6.0 - sector;

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - fraction * saturation);
    let t = value * (1.0 - (1.0 - fraction) * saturation);

    match (sector as i32).rem_euclid(6) {
        0 => Vector3::new(value, t, p),
        1 => Vector3::new(q, value, p),
        2 => Vector3::new(p, value, t),
        3 => Vector3::new(p, q, value),
        4 => Vector3::new(t, p, value),
        _ => Vector3::new(value, p, q),
    }
}
