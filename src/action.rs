use everscale_types::error::Error;
use everscale_types::models::OutAction;
use everscale_types::prelude::*;

/// Max number of actions in a single list.
pub const MAX_ACTIONS: usize = 255;

/// Unpacks an action list (`c5`) into actions in execution order.
///
/// Each list node contains a reference to the previous node followed by
/// an action. The list terminates with an empty cell.
pub fn parse_actions_list(actions: &Cell) -> Result<Vec<OutAction>, Error> {
    let mut list = Vec::new();

    let mut node = actions.as_ref();
    loop {
        if node.is_exotic() {
            // Actions list item must be an ordinary cell.
            return Err(Error::InvalidData);
        }

        let mut cs = ok!(node.as_slice());
        if cs.is_empty() {
            break;
        }

        let prev = ok!(cs.load_reference());
        let action = ok!(OutAction::load_from(&mut cs));
        if !cs.is_empty() {
            return Err(Error::InvalidData);
        }

        list.push(action);
        if list.len() > MAX_ACTIONS {
            return Err(Error::InvalidData);
        }

        node = prev;
    }

    list.reverse();
    Ok(list)
}

/// Returns code from the last `SetCode` action.
pub fn find_new_code(actions: &[OutAction]) -> Option<&Cell> {
    actions.iter().rev().find_map(|action| match action {
        OutAction::SetCode { new_code } => Some(new_code),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) fn build_actions_list(actions: &[OutAction]) -> Cell {
    let mut prev = Cell::empty_cell();
    for action in actions {
        let mut b = CellBuilder::new();
        b.store_reference(prev).unwrap();
        action.store_into(&mut b, Cell::empty_context()).unwrap();
        prev = b.build().unwrap();
    }
    prev
}
