use glam::{Mat4, Vec3};

use crate::eval::ProcessContext;
use crate::node::NodeError;

pub(crate) const PRE_TRANSFORM: i32 = 0;

// Axis indices for each "Rotation Order" entry, X Y Z through Z Y X.
const ROTATION_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

const AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransformParams {
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: Vec3,
    pub pivot: Vec3,
    pub uniform_scale: f32,
    pub rotation_order: usize,
    pub pre_transform: bool,
    pub invert: bool,
}

impl TransformParams {
    // pre composition multiplies each step on the right, post on the left
    pub(crate) fn matrix(&self) -> Mat4 {
        let order = ROTATION_ORDERS[self.rotation_order.min(ROTATION_ORDERS.len() - 1)];
        let steps = [
            Mat4::from_translation(self.pivot),
            rotation(self.rotate, order[0]),
            rotation(self.rotate, order[1]),
            rotation(self.rotate, order[2]),
            Mat4::from_scale(self.scale * self.uniform_scale),
            Mat4::from_translation(-self.pivot),
            Mat4::from_translation(self.translate),
        ];

        let matrix = steps.iter().fold(Mat4::IDENTITY, |acc, step| {
            if self.pre_transform {
                acc * *step
            } else {
                *step * acc
            }
        });

        if self.invert {
            matrix.inverse()
        } else {
            matrix
        }
    }

    pub(crate) fn apply(&self, primitive_matrix: Mat4) -> Mat4 {
        if self.pre_transform {
            self.matrix() * primitive_matrix
        } else {
            primitive_matrix * self.matrix()
        }
    }
}

fn rotation(degrees: Vec3, axis: usize) -> Mat4 {
    Mat4::from_axis_angle(AXES[axis], degrees[axis].to_radians())
}

pub(crate) fn process(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let params = TransformParams {
        translate: ctx.eval_vec3("Translate")?,
        rotate: ctx.eval_vec3("Rotate")?,
        scale: ctx.eval_vec3("Scale")?,
        pivot: ctx.eval_vec3("Pivot")?,
        uniform_scale: ctx.eval_float("Uniform Scale")?,
        rotation_order: usize::try_from(ctx.eval_enum("Rotation Order")?).unwrap_or(0),
        pre_transform: ctx.eval_enum("Transform Order")? == PRE_TRANSFORM,
        invert: ctx.eval_bool("Invert Transformation")?,
    };

    if params.invert && params.matrix().determinant().abs() <= f32::EPSILON {
        ctx.warn("transformation is not invertible, primitives left unchanged");
        return Ok(());
    }

    for prim in ctx.collection_mut().iter_mut() {
        let matrix = params.apply(prim.matrix());
        prim.set_matrix(matrix);
    }
    Ok(())
}
