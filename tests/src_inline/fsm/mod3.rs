use super::mod3_machine;
use crate::fsm::FsmError;

#[test]
fn test_remainders_of_known_values() {
    let mut machine = mod3_machine();
    assert_eq!(machine.process("1101".chars()).unwrap(), 1);
    assert_eq!(machine.process("1110".chars()).unwrap(), 2);
    assert_eq!(machine.process("1111".chars()).unwrap(), 0);
}

#[test]
fn test_single_bits_and_empty() {
    let mut machine = mod3_machine();
    assert_eq!(machine.process("".chars()).unwrap(), 0);
    assert_eq!(machine.process("0".chars()).unwrap(), 0);
    assert_eq!(machine.process("1".chars()).unwrap(), 1);
    assert_eq!(machine.process("10".chars()).unwrap(), 2);
    assert_eq!(machine.process("11".chars()).unwrap(), 0);
}

#[test]
fn test_rejects_non_binary_symbols() {
    let mut machine = mod3_machine();
    assert!(matches!(
        machine.process("102".chars()),
        Err(FsmError::InvalidSymbol { symbol: '2', .. })
    ));

    machine.reset();
    assert!(machine.process("a".chars()).is_err());
}

#[test]
fn test_rejection_preserves_prior_state() {
    let mut machine = mod3_machine();
    // "10" is 2, so the machine sits in state 2 when '2' is rejected
    let err = machine.process("102".chars()).unwrap_err();
    assert_eq!(
        err,
        FsmError::InvalidSymbol {
            state: 2,
            symbol: '2',
            position: 2
        }
    );
    assert_eq!(machine.current_state(), 2);
}

#[test]
fn test_matches_integer_arithmetic() {
    let mut machine = mod3_machine();
    for value in 0u32..64 {
        let bits = format!("{value:b}");
        assert_eq!(
            machine.process(bits.chars()).unwrap(),
            (value % 3) as u8,
            "value {value}"
        );
    }
}
