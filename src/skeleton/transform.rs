use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::body::Joint;

use super::bone::ThicknessClass;

/// ミリメートル → メートル
pub const MILLIMETERS_PER_METER: f32 = 1000.0;

/// 関節表示の大きさ (単位変換とは無関係の見た目の定数)
pub const JOINT_SCALE: f32 = 0.001;

/// 関節の描画用トランスフォーム
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    /// ルート基準のローカル位置 (メートル)
    pub local_position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// 一様スケール
    pub scale: f32,
}

impl Default for JointTransform {
    fn default() -> Self {
        Self {
            local_position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: JOINT_SCALE,
        }
    }
}

impl JointTransform {
    /// 関節データから計算
    ///
    /// - 位置: ワールド座標 / 1000
    /// - 回転: 姿勢行列の forward 列と up 列からの look rotation
    pub fn from_joint(joint: &Joint) -> Self {
        let p = joint.world_position;
        Self {
            local_position: Vector3::new(p[0], p[1], p[2]) / MILLIMETERS_PER_METER,
            rotation: look_rotation(&joint.orientation.forward(), &joint.orientation.up()),
            scale: JOINT_SCALE,
        }
    }
}

/// 骨の描画用トランスフォーム
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    /// 両端関節の中点 (ワールド座標)
    pub position: Point3<f32>,
    /// Z軸まわりの回転 (度)
    pub rotation_z_degrees: f32,
    /// (太さ, 長さ, 太さ)。長さはローカルY軸
    pub scale: Vector3<f32>,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation_z_degrees: 0.0,
            scale: Vector3::new(1.0, 0.0, 1.0),
        }
    }
}

impl BoneTransform {
    /// 両端のワールド位置から計算
    ///
    /// 回転と長さは XY 平面への射影のみを使う (Z は無視)
    pub fn between(start: &Point3<f32>, end: &Point3<f32>, class: ThicknessClass) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length = (dx * dx + dy * dy).sqrt() * class.length_factor();
        let thickness = class.thickness();

        Self {
            position: nalgebra::center(start, end),
            rotation_z_degrees: angle_2d_degrees(dx, dy),
            scale: Vector3::new(thickness, length, thickness),
        }
    }

    pub fn rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.rotation_z_degrees.to_radians())
    }

    /// 描画用の長さ方向 (ローカルY軸を回転させたもの)
    pub fn axis(&self) -> Vector3<f32> {
        self.rotation() * Vector3::y()
    }
}

/// 画像平面上の向き: -atan2(dx, dy) を度で返す
pub fn angle_2d_degrees(dx: f32, dy: f32) -> f32 {
    -f32::atan2(dx, dy).to_degrees()
}

/// forward をZ軸、up をおおよそのY軸とする回転
///
/// forward が0ベクトルなら回転なし、up と平行なら最短回転で forward に向ける
pub fn look_rotation(forward: &Vector3<f32>, up: &Vector3<f32>) -> UnitQuaternion<f32> {
    const EPSILON: f32 = 1e-6;

    if forward.norm_squared() < EPSILON {
        return UnitQuaternion::identity();
    }
    if up.cross(forward).norm_squared() < EPSILON {
        return UnitQuaternion::rotation_between(&Vector3::z(), forward)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI));
    }
    UnitQuaternion::face_towards(forward, up)
}
