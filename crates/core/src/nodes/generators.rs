use crate::eval::ProcessContext;
use crate::mesh_primitives::{
    make_box, make_circle, make_cylinder, make_grid, make_icosphere, make_torus,
};
use crate::node::NodeError;

fn count(value: i32, min: u32) -> u32 {
    u32::try_from(value).unwrap_or(0).max(min)
}

pub(crate) fn process_box(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let size = ctx.eval_vec3("Size")? * ctx.eval_float("Uniform Scale")?;
    let center = ctx.eval_vec3("Center")?;
    ctx.collection_mut().add(make_box(size, center));
    Ok(())
}

pub(crate) fn process_grid(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let size = ctx.eval_vec3("Size")?;
    let center = ctx.eval_vec3("Center")?;
    let rows = count(ctx.eval_int("Rows")?, 2);
    let columns = count(ctx.eval_int("Columns")?, 2);
    ctx.collection_mut()
        .add(make_grid(size, center, rows, columns));
    Ok(())
}

pub(crate) fn process_torus(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let center = ctx.eval_vec3("Center")?;
    let uniform_scale = ctx.eval_float("Uniform Scale")?;
    let major_radius = ctx.eval_float("Major Radius")? * uniform_scale;
    let minor_radius = ctx.eval_float("Minor Radius")? * uniform_scale;
    let major_segment = count(ctx.eval_int("Major Segment")?, 1);
    let minor_segment = count(ctx.eval_int("Minor Segment")?, 1);
    ctx.collection_mut().add(make_torus(
        center,
        major_radius,
        minor_radius,
        major_segment,
        minor_segment,
    ));
    Ok(())
}

pub(crate) fn process_circle(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let segments = count(ctx.eval_int("Vertices")?, 3);
    let radius = ctx.eval_float("Radius")?;
    ctx.collection_mut().add(make_circle(segments, radius));
    Ok(())
}

pub(crate) fn process_tube(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let segments = count(ctx.eval_int("Vertices")?, 3);
    let radius = ctx.eval_float("Radius")?;
    let depth = ctx.eval_float("Depth")?;
    ctx.collection_mut()
        .add(make_cylinder(segments, radius, radius, depth));
    Ok(())
}

pub(crate) fn process_cone(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let segments = count(ctx.eval_int("Vertices")?, 3);
    let bottom = ctx.eval_float("Major Radius")?;
    let top = ctx.eval_float("Minor Radius")?;
    let depth = ctx.eval_float("Depth")?;
    ctx.collection_mut()
        .add(make_cylinder(segments, bottom, top, depth));
    Ok(())
}

pub(crate) fn process_icosphere(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let radius = ctx.eval_float("Radius")?;
    ctx.collection_mut().add(make_icosphere(radius));
    Ok(())
}
