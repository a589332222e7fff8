use nalgebra::Point3;

use crate::skeleton::{BoneTransform, ThicknessClass};

/// 背景色 (RGB)
pub const BACKGROUND_COLOR: u32 = 0x101018;

/// 関節の色 (RGB)
pub const JOINT_COLOR: u32 = 0x00FF00; // 緑

/// 骨の色 (RGB)
pub const BONE_COLOR: u32 = 0xFFFF00; // 黄色

/// 筋肉の色 (RGB)
pub const MUSCLE_COLOR: u32 = 0xFF6040; // 赤系

/// 頭の色 (RGB)
pub const HEAD_COLOR: u32 = 0x40C0FF; // 水色

/// 原点の十字の色 (RGB)
pub const ORIGIN_COLOR: u32 = 0x404060;

pub fn bone_color(class: ThicknessClass) -> u32 {
    match class {
        ThicknessClass::Head => HEAD_COLOR,
        ThicknessClass::Muscle => MUSCLE_COLOR,
        ThicknessClass::Bone => BONE_COLOR,
    }
}

/// 線の太さ (ピクセル半径)
pub fn bone_radius(class: ThicknessClass) -> i32 {
    match class {
        ThicknessClass::Head => 5,
        ThicknessClass::Muscle => 2,
        ThicknessClass::Bone => 1,
    }
}

/// 骨の両端 (XY平面、メートル)
pub fn bone_segment(transform: &BoneTransform) -> ((f32, f32), (f32, f32)) {
    let half = transform.axis() * (transform.scale.y / 2.0);
    let c = transform.position;
    ((c.x - half.x, c.y - half.y), (c.x + half.x, c.y + half.y))
}

/// XY平面を画面へ投影する (原点は画面中央、Y軸は上向き)
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    pub width: usize,
    pub height: usize,
    pub pixels_per_meter: f32,
}

impl ViewProjection {
    pub fn to_pixel(&self, x: f32, y: f32) -> (i32, i32) {
        let px = self.width as f32 / 2.0 + x * self.pixels_per_meter;
        let py = self.height as f32 / 2.0 - y * self.pixels_per_meter;
        (px.round() as i32, py.round() as i32)
    }

    pub fn project(&self, p: &Point3<f32>) -> (i32, i32) {
        self.to_pixel(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_bone_segment_recovers_endpoints() {
        let start = Point3::new(0.1, 0.2, 2.0);
        let end = Point3::new(0.4, 0.6, 2.0);
        let t = BoneTransform::between(&start, &end, ThicknessClass::Bone);
        let ((x0, y0), (x1, y1)) = bone_segment(&t);
        assert!(approx_eq(x0, 0.1) && approx_eq(y0, 0.2));
        assert!(approx_eq(x1, 0.4) && approx_eq(y1, 0.6));
    }

    #[test]
    fn test_projection_center_and_y_up() {
        let view = ViewProjection {
            width: 800,
            height: 600,
            pixels_per_meter: 100.0,
        };
        assert_eq!(view.to_pixel(0.0, 0.0), (400, 300));
        assert_eq!(view.to_pixel(1.0, 1.0), (500, 200));
        assert_eq!(view.project(&Point3::new(-0.5, -0.5, 3.0)), (350, 350));
    }
}
