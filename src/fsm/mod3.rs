use std::collections::BTreeMap;

use crate::diag::DiagSink;
use crate::fsm::Machine;

/// Remainder automaton for binary strings read most-significant bit first.
///
/// States are the remainder classes 0..3: reading bit `b` in state `r`
/// moves to `(2r + b) % 3`, since appending a bit doubles the value read so
/// far and adds `b`. The output table is the identity, so the final state
/// is the remainder itself.
pub fn mod3_machine() -> Machine<u8, char, u8> {
    let (transitions, outputs) = mod3_tables();
    Machine::new(transitions, outputs, 0)
}

pub fn mod3_machine_with_diagnostics(diag: Box<dyn DiagSink>) -> Machine<u8, char, u8> {
    let (transitions, outputs) = mod3_tables();
    Machine::with_diagnostics(transitions, outputs, 0, diag)
}

fn mod3_tables() -> (BTreeMap<(u8, char), u8>, BTreeMap<u8, u8>) {
    let mut transitions = BTreeMap::new();
    let mut outputs = BTreeMap::new();
    for state in 0u8..3 {
        transitions.insert((state, '0'), (2 * state) % 3);
        transitions.insert((state, '1'), (2 * state + 1) % 3);
        outputs.insert(state, state);
    }
    (transitions, outputs)
}

#[cfg(test)]
#[path = "../../tests/src_inline/fsm/mod3.rs"]
mod tests;
