use crate::eval::ProcessContext;
use crate::node::NodeError;

const SECOND_INPUT: usize = 1;

pub(crate) fn process(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    if ctx.input_collection(SECOND_INPUT)?.is_none() {
        return Ok(());
    }
    let mut other = ctx.take_input_collection(SECOND_INPUT)?;
    ctx.collection_mut().merge(&mut other);
    Ok(())
}
