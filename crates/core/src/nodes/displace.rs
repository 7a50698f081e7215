use glam::Vec3;

use crate::eval::ProcessContext;
use crate::fractal::FractalNoise;
use crate::node::NodeError;
use crate::primitive::PrimitiveKind;

const NOISE_SEED: u32 = 0;

pub(crate) fn process(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let mut noise = FractalNoise::new(NOISE_SEED);
    noise.octaves = u32::try_from(ctx.eval_int("Octaves")?).unwrap_or(1);
    noise.frequency = ctx.eval_float("Frequency")?;
    noise.amplitude = ctx.eval_float("Amplitude")?;
    noise.persistence = ctx.eval_float("Persistence")?;
    noise.lacunarity = ctx.eval_float("Lacunarity")?;

    for prim in ctx.collection_mut().iter_mut() {
        if prim.kind() == PrimitiveKind::Segments {
            continue;
        }
        for point in prim.points_mut() {
            *point += Vec3::splat(noise.sample(*point));
        }
    }
    Ok(())
}
