use anyhow::Result;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::controls::{BodyTrackingFeatures, OptimizationPreset, SkeletonProfile};
use crate::render::keys::ControlKey;
use crate::render::skeleton::{
    bone_color, bone_radius, bone_segment, ViewProjection, BACKGROUND_COLOR, JOINT_COLOR, ORIGIN_COLOR,
};
use crate::skeleton::SkeletonMapper;

/// minifbを使用したデバッグビュー (XY平面を正面から見る)
pub struct MinifbRenderer {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    projection: ViewProjection,
}

impl MinifbRenderer {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize, pixels_per_meter: f32) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        Ok(Self {
            window,
            buffer: vec![BACKGROUND_COLOR; width * height],
            width,
            height,
            projection: ViewProjection {
                width,
                height,
                pixels_per_meter,
            },
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// 前回の update 以降に押されたキー
    pub fn control_keys(&self) -> Vec<ControlKey> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(control_key)
            .collect()
    }

    /// 表示中の骨と関節を描画
    pub fn draw_skeletons(&mut self, mapper: &SkeletonMapper) {
        self.buffer.fill(BACKGROUND_COLOR);

        let (ox, oy) = self.projection.to_pixel(0.0, 0.0);
        self.draw_line(ox - 10, oy, ox + 10, oy, ORIGIN_COLOR, 0);
        self.draw_line(ox, oy - 10, ox, oy + 10, ORIGIN_COLOR, 0);

        for body in mapper.bodies() {
            for bone in body.visible_bones() {
                let class = bone.bone.thickness_class();
                let ((x0, y0), (x1, y1)) = bone_segment(&bone.transform);
                let (px0, py0) = self.projection.to_pixel(x0, y0);
                let (px1, py1) = self.projection.to_pixel(x1, y1);
                self.draw_line(px0, py0, px1, py1, bone_color(class), bone_radius(class));
            }
            for joint in body.visible_joints() {
                let (px, py) = self.projection.project(&joint.world_position);
                self.draw_circle(px, py, 3, JOINT_COLOR);
            }
        }
    }

    /// バッファをウィンドウに表示
    pub fn update(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }

    /// Bresenhamのアルゴリズムで線を描画 (radius > 0 なら各点に円を打つ)
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32, radius: i32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            if radius > 0 {
                self.draw_circle(x, y, radius, color);
            } else {
                self.set_pixel(x, y, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }
}

fn control_key(key: Key) -> Option<ControlKey> {
    let control = match key {
        Key::Key1 => ControlKey::Features(BodyTrackingFeatures::Segmentation),
        Key::Key2 => ControlKey::Features(BodyTrackingFeatures::Skeleton),
        Key::Key3 => ControlKey::Features(BodyTrackingFeatures::HandPose),
        Key::F => ControlKey::Profile(SkeletonProfile::Full),
        Key::U => ControlKey::Profile(SkeletonProfile::UpperBody),
        Key::B => ControlKey::Profile(SkeletonProfile::Basic),
        Key::A => ControlKey::Preset(OptimizationPreset::BestAccuracy),
        Key::S => ControlKey::Preset(OptimizationPreset::Balanced),
        Key::M => ControlKey::Preset(OptimizationPreset::MinimizeMemory),
        Key::Up => ControlKey::SliderUp,
        Key::Down => ControlKey::SliderDown,
        _ => return None,
    };
    Some(control)
}
