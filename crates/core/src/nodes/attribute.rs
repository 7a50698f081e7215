use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::attributes::{AttributeData, AttributeType};
use crate::eval::ProcessContext;
use crate::node::NodeError;

const SEED_BASE: u64 = 19937;

fn attribute_key(ctx: &mut ProcessContext<'_>) -> Result<Option<(String, AttributeType)>, NodeError> {
    let name = ctx.eval_string("Name")?;
    let index = ctx.eval_enum("Type")?;
    let attribute_type = AttributeType::from_index(index)
        .ok_or_else(|| NodeError::Failed(format!("unknown attribute type index {index}")))?;
    if name.trim().is_empty() {
        ctx.warn("attribute name is empty");
        return Ok(None);
    }
    Ok(Some((name, attribute_type)))
}

pub(crate) fn process_create(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let Some((name, attribute_type)) = attribute_key(ctx)? else {
        return Ok(());
    };

    let mut existing = 0usize;
    for prim in ctx.collection_mut().iter_mut() {
        if prim.attribute(&name, attribute_type).is_some() {
            existing += 1;
            continue;
        }
        let size = prim.points().len();
        prim.add_attribute(&name, attribute_type, size);
    }

    if existing > 0 {
        ctx.warn(format!(
            "attribute '{name}' ({}) already exists on {existing} primitive(s)",
            attribute_type.name()
        ));
    }
    Ok(())
}

pub(crate) fn process_delete(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let Some((name, attribute_type)) = attribute_key(ctx)? else {
        return Ok(());
    };

    let mut missing = 0usize;
    for prim in ctx.collection_mut().iter_mut() {
        if prim.remove_attribute(&name, attribute_type).is_none() {
            missing += 1;
        }
    }

    if missing > 0 {
        ctx.warn(format!(
            "attribute '{name}' ({}) is missing on {missing} primitive(s)",
            attribute_type.name()
        ));
    }
    Ok(())
}

fn sample(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.random::<f32>()
}

fn randomise(data: &mut AttributeData, rng: &mut StdRng, min: f32, max: f32) -> bool {
    match data {
        AttributeData::Int(values) => {
            let (lo, hi) = (min.round() as i32, max.round() as i32);
            for v in values.iter_mut() {
                *v = rng.random_range(lo.min(hi)..=hi.max(lo));
            }
        }
        AttributeData::Float(values) => {
            for v in values.iter_mut() {
                *v = sample(rng, min, max);
            }
        }
        AttributeData::Vec2(values) => {
            for v in values.iter_mut() {
                *v = Vec2::new(sample(rng, min, max), sample(rng, min, max));
            }
        }
        AttributeData::Vec3(values) => {
            for v in values.iter_mut() {
                *v = Vec3::from_array([(); 3].map(|_| sample(rng, min, max)));
            }
        }
        AttributeData::Vec4(values) => {
            for v in values.iter_mut() {
                *v = Vec4::from_array([(); 4].map(|_| sample(rng, min, max)));
            }
        }
        AttributeData::Byte(_)
        | AttributeData::String(_)
        | AttributeData::Mat3(_)
        | AttributeData::Mat4(_) => return false,
    }
    true
}

pub(crate) fn process_randomise(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let Some((name, attribute_type)) = attribute_key(ctx)? else {
        return Ok(());
    };
    let seed = ctx.eval_int("Seed")?;
    let min = ctx.eval_float("Min")?;
    let max = ctx.eval_float("Max")?;

    if matches!(
        attribute_type,
        AttributeType::Byte | AttributeType::String | AttributeType::Mat3 | AttributeType::Mat4
    ) {
        ctx.warn(format!(
            "cannot randomise attributes of type {}",
            attribute_type.name()
        ));
        return Ok(());
    }

    let mut rng = StdRng::seed_from_u64(SEED_BASE + u64::from(seed.unsigned_abs()));
    let mut missing = 0usize;
    for prim in ctx.collection_mut().iter_mut() {
        match prim.attributes_mut().get_mut(&name, attribute_type) {
            Some(attribute) => {
                randomise(attribute.data_mut(), &mut rng, min, max);
            }
            None => missing += 1,
        }
    }

    if missing > 0 {
        ctx.warn(format!(
            "attribute '{name}' ({}) is missing on {missing} primitive(s)",
            attribute_type.name()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn randomise_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(SEED_BASE);
        let mut data = AttributeData::new(AttributeType::Vec3, 64);
        assert!(randomise(&mut data, &mut rng, -2.0, 3.0));
        let AttributeData::Vec3(values) = &data else {
            panic!("type changed");
        };
        assert!(values
            .iter()
            .all(|v| v.min_element() >= -2.0 && v.max_element() <= 3.0));

        let mut ints = AttributeData::new(AttributeType::Int, 64);
        randomise(&mut ints, &mut rng, 1.0, 4.0);
        let AttributeData::Int(values) = &ints else {
            panic!("type changed");
        };
        assert!(values.iter().all(|v| (1..=4).contains(v)));
    }

    #[test]
    fn matrices_are_not_randomised() {
        let mut rng = StdRng::seed_from_u64(SEED_BASE);
        let mut data = AttributeData::new(AttributeType::Mat4, 2);
        let before = data.clone();
        assert!(!randomise(&mut data, &mut rng, 0.0, 1.0));
        assert_eq!(data, before);
    }
}
