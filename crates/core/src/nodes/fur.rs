use glam::Vec3;

use crate::attributes::AttributeType;
use crate::eval::ProcessContext;
use crate::node::NodeError;
use crate::nodes::normal::NORMAL_ATTRIBUTE;
use crate::params::Properties;
use crate::primitive::SegmentPrim;

pub(crate) fn update_properties(props: &mut Properties) -> bool {
    let use_normals = props.eval_bool("Use Normals").unwrap_or(false);
    props.set_visible("Direction", !use_normals).is_ok()
}

pub(crate) fn process(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let segments = u32::try_from(ctx.eval_int("Segments")?).unwrap_or(1).max(1);
    let length = ctx.eval_float("Length")?;
    let use_normals = ctx.eval_bool("Use Normals")?;
    let direction = ctx.eval_vec3("Direction")?;

    let root_count: usize = ctx.collection().meshes().map(|m| m.points.len()).sum();
    if ctx.collection().meshes().next().is_none() {
        ctx.warn("no mesh to grow fur from");
        return Ok(());
    }

    let reserved = root_count * (segments as usize + 1);
    let mut fur = SegmentPrim::default();
    fur.points.reserve(reserved);
    fur.edges.reserve(root_count * segments as usize);

    let mut missing_normals = 0usize;
    let mut degenerate = 0usize;
    for mesh in ctx.collection().meshes() {
        let normals = if use_normals {
            let normals = mesh
                .attributes
                .get(NORMAL_ATTRIBUTE, AttributeType::Vec3)
                .and_then(|attribute| attribute.as_vec3())
                .filter(|normals| normals.len() == mesh.points.len());
            if normals.is_none() {
                missing_normals += 1;
            }
            normals
        } else {
            None
        };

        for (index, point) in mesh.points.iter().enumerate() {
            let root = mesh.matrix.transform_point3(*point);
            let grow = match normals {
                Some(normals) => mesh.matrix.transform_vector3(normals[index]),
                None => direction,
            }
            .normalize_or_zero();
            if grow == Vec3::ZERO {
                degenerate += 1;
                continue;
            }

            let base = fur.points.len() as u32;
            for step in 0..=segments {
                let t = step as f32 / segments as f32;
                fur.points.push(root + grow * (length * t));
            }
            for step in 0..segments {
                fur.edges.push([base + step, base + step + 1]);
            }
        }
    }

    let produced = fur.points.len();
    ctx.collection_mut().add(fur);

    if missing_normals > 0 {
        ctx.warn(format!(
            "{missing_normals} mesh(es) have no usable \"{NORMAL_ATTRIBUTE}\" attribute, using Direction"
        ));
    }
    if degenerate > 0 {
        ctx.warn(format!("{degenerate} point(s) have no growth direction"));
    }
    if produced != reserved {
        ctx.warn(format!(
            "fur point count mismatch: reserved {reserved}, produced {produced}"
        ));
    }
    Ok(())
}
