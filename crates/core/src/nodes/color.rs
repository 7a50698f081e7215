use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::attributes::AttributeType;
use crate::eval::ProcessContext;
use crate::node::NodeError;
use crate::params::Properties;
use crate::primitive::PrimitiveKind;

pub(crate) const SCOPE_VERTEX: i32 = 0;
pub(crate) const SCOPE_PRIMITIVE: i32 = 1;
pub(crate) const FILL_UNIQUE: i32 = 0;
pub(crate) const FILL_RANDOM: i32 = 1;

pub(crate) const COLOR_ATTRIBUTE: &str = "color";
const SEED_BASE: u64 = 19937;

pub(crate) fn update_properties(props: &mut Properties) -> bool {
    let random = matches!(props.eval_enum("Fill Method"), Ok(FILL_RANDOM));
    let toggles = [("Color", !random), ("Seed", random), ("Scope", random)];
    for (name, visible) in toggles {
        if props.set_visible(name, visible).is_err() {
            return false;
        }
    }
    true
}

fn random_color(rng: &mut StdRng) -> Vec3 {
    Vec3::new(rng.random(), rng.random(), rng.random())
}

pub(crate) fn process(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let method = ctx.eval_enum("Fill Method")?;
    let scope = ctx.eval_enum("Scope")?;
    let seed = ctx.eval_int("Seed")?;
    let color = ctx.eval_vec3("Color")?;

    let mut rng = StdRng::seed_from_u64(SEED_BASE + u64::from(seed.unsigned_abs()));

    for prim in ctx.collection_mut().iter_mut() {
        if prim.kind() == PrimitiveKind::Segments {
            continue;
        }
        let size = prim.points().len();
        let attribute = prim.add_attribute(COLOR_ATTRIBUTE, AttributeType::Vec3, size);
        let Some(colors) = attribute.as_vec3_mut() else {
            continue;
        };

        match (method, scope) {
            (FILL_RANDOM, SCOPE_VERTEX) => {
                for slot in colors.iter_mut() {
                    *slot = random_color(&mut rng);
                }
            }
            (FILL_RANDOM, _) => colors.fill(random_color(&mut rng)),
            _ => colors.fill(color),
        }
    }
    Ok(())
}
