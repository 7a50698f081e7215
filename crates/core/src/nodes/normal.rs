use crate::attributes::AttributeType;
use crate::eval::ProcessContext;
use crate::node::NodeError;

pub(crate) const NORMAL_ATTRIBUTE: &str = "normal";

pub(crate) fn process(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let flip = ctx.eval_bool("Flip")?;

    for mesh in ctx.collection_mut().meshes_mut() {
        let mut normals = mesh.accumulate_normals();
        if flip {
            for normal in &mut normals {
                *normal = -normal.normalize_or_zero();
            }
        }

        let size = mesh.points.len();
        let attribute = mesh.attributes.add(NORMAL_ATTRIBUTE, AttributeType::Vec3, size);
        if let Some(slots) = attribute.as_vec3_mut() {
            slots.copy_from_slice(&normals);
        }
    }
    Ok(())
}
