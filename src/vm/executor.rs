use crate::constants::RECORD_BYTES;
use crate::dictionary::{Mnemonic, RegisterId};
use crate::encoder::{decode_record, DecodedRecord};

use super::handlers;
use super::{RuntimeError, VmState};

/// Runs the two-pass executor over `code` (the bytecode buffer with the
/// 8-byte file header already stripped), mutating `state` in place.
pub fn execute(code: &[u8], state: &mut VmState) -> Result<(), RuntimeError> {
    prepass(code, state)?;
    state.ip = 0;
    run(code, state)
}

fn prepass(code: &[u8], state: &mut VmState) -> Result<(), RuntimeError> {
    let mut offset = 0;
    while offset < code.len() {
        let record = decode_record(code, offset)?;
        if record.mnemonic == Mnemonic::LABEL {
            handlers::label(state, &record, offset);
        }
        offset += RECORD_BYTES;
    }
    log::debug!("label pre-pass registered {} labels", state.labels.len());
    Ok(())
}

fn run(code: &[u8], state: &mut VmState) -> Result<(), RuntimeError> {
    while state.ip < code.len() && !state.halted {
        let record = decode_record(code, state.ip)?;
        log::trace!("dispatch {:?} at offset {}", record.mnemonic, state.ip);
        dispatch(state, &record)?;
        state.ip += RECORD_BYTES;
    }
    Ok(())
}

fn dispatch(state: &mut VmState, record: &DecodedRecord) -> Result<(), RuntimeError> {
    use Mnemonic::*;

    match record.mnemonic {
        ADD => handlers::binary_op(state, record, |a, b| Ok(a + b)),
        SUB => handlers::binary_op(state, record, |a, b| Ok(a - b)),
        MUL => handlers::binary_op(state, record, |a, b| Ok(a * b)),
        DIV => handlers::binary_op(state, record, |a, b| {
            if b == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }),
        AND => handlers::binary_op(state, record, |a, b| Ok(a & b)),
        OR => handlers::binary_op(state, record, |a, b| Ok(a | b)),
        XOR => handlers::binary_op(state, record, |a, b| Ok(a ^ b)),
        MOV => handlers::binary_op(state, record, |_, b| Ok(b)),
        NOT => handlers::binary_op(state, record, |_, b| Ok(!b)),
        CMP => handlers::cmp(state, record),

        JMP => handlers::jump_if(state, record, |_| true),
        JMP_EQ => handlers::jump_if(state, record, |s| s.registers[RegisterId::EQ.index()] != 0),
        JMP_LT => handlers::jump_if(state, record, |s| s.registers[RegisterId::LT.index()] != 0),
        JMP_GT => handlers::jump_if(state, record, |s| s.registers[RegisterId::GT.index()] != 0),
        JMP_NE => handlers::jump_if(state, record, |s| s.registers[RegisterId::NE.index()] != 0),

        LABEL => {
            handlers::label(state, record, state.ip);
            Ok(())
        }

        PRINT => handlers::print(state, record),
        INPUT => handlers::input(state, record),

        NOP => Ok(()),
        // Reserved: round-trip correctly but carry no subroutine convention.
        CALL | RET => Ok(()),
        END => {
            state.halted = true;
            Ok(())
        }
    }
}
