//! Invert offset normalisation at confluences.

use std::collections::BTreeMap;

use sf_core::units::Length;
use sf_core::{LinkId, SfError};
use sf_hydraulics::Conduit;
use tracing::debug;

use crate::error::{SimError, SimResult};

fn conduit(conduits: &[Conduit], id: LinkId) -> SimResult<&Conduit> {
    conduits.get(id.slot()).ok_or(SimError::Core(SfError::IndexOob {
        what: "conduit",
        index: id.slot(),
        len: conduits.len(),
    }))
}

fn downstream_depth(conduits: &[Conduit], id: LinkId) -> SimResult<Length> {
    let c = conduit(conduits, id)?;
    c.downstream_water_depth()
        .map_err(|e| SimError::link(&c.name, e))
}

fn shift(conduits: &mut [Conduit], links: &[LinkId], delta: Length) -> SimResult<()> {
    for &id in links {
        conduit(conduits, id)?;
        conduits[id.slot()].shift_offsets(delta);
    }
    Ok(())
}

/// Lower the outgoing link and every shallower branch to the deepest
/// downstream water depth found among them.
///
/// `branches` maps each branch head (the link entering the junction) to every
/// link of that branch; a whole branch moves by the same amount.
pub fn normalize_offsets(
    conduits: &mut [Conduit],
    outgoing: LinkId,
    branches: &BTreeMap<LinkId, Vec<LinkId>>,
) -> SimResult<()> {
    let out_depth = downstream_depth(conduits, outgoing)?;
    let mut max_depth = out_depth;
    for &head in branches.keys() {
        let depth = downstream_depth(conduits, head)?;
        if depth > max_depth {
            max_depth = depth;
        }
    }

    if out_depth < max_depth {
        shift(conduits, &[outgoing], max_depth - out_depth)?;
    }
    for (&head, links) in branches {
        let depth = downstream_depth(conduits, head)?;
        if depth < max_depth {
            let delta = max_depth - depth;
            debug!(head = %head, delta_m = delta.value, "lowering branch");
            shift(conduits, links, delta)?;
        }
    }
    Ok(())
}
