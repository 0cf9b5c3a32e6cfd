use crate::dictionary::{OperandMode, RegisterId};
use crate::encoder::DecodedRecord;

use super::{RuntimeError, VmState};

pub fn read_operand(state: &VmState, mode: OperandMode, payload: i32) -> Result<i64, RuntimeError> {
    match mode {
        OperandMode::Register => Ok(state.registers[payload as usize]),
        OperandMode::RegisterPointer => {
            let address = state.registers[payload as usize];
            read_memory(state, address)
        }
        OperandMode::InPlaceValue => Ok(i64::from(payload)),
        OperandMode::Nop | OperandMode::Label => Err(RuntimeError::BadArgument(mode)),
    }
}

pub fn write_operand(
    state: &mut VmState,
    mode: OperandMode,
    payload: i32,
    value: i64,
) -> Result<(), RuntimeError> {
    match mode {
        OperandMode::Register => {
            state.registers[payload as usize] = value;
            Ok(())
        }
        OperandMode::RegisterPointer => {
            let address = state.registers[payload as usize];
            write_memory(state, address, value)
        }
        OperandMode::Nop | OperandMode::Label | OperandMode::InPlaceValue => {
            Err(RuntimeError::BadArgument(mode))
        }
    }
}

fn bounds_check(state: &VmState, address: i64) -> Result<(), RuntimeError> {
    if address < 0 || address as usize >= state.memory.len() {
        return Err(RuntimeError::BadMemoryAccess(address, state.memory.len()));
    }
    Ok(())
}

fn read_memory(state: &VmState, address: i64) -> Result<i64, RuntimeError> {
    bounds_check(state, address)?;
    Ok(state.memory[address as usize])
}

fn write_memory(state: &mut VmState, address: i64, value: i64) -> Result<(), RuntimeError> {
    bounds_check(state, address)?;
    state.memory[address as usize] = value;
    Ok(())
}

/// Realizes the binary-arithmetic/logical instruction family: read both
/// operands, combine them with `f`, write the result back to operand 1.
/// `MOV` passes `f(_, x) = x`; `NOT` passes `f(_, y) = !y` over an operand
/// the parser has duplicated into both slots.
pub fn binary_op(
    state: &mut VmState,
    record: &DecodedRecord,
    f: impl Fn(i64, i64) -> Result<i64, RuntimeError>,
) -> Result<(), RuntimeError> {
    let left = read_operand(state, record.mode1, record.payload1)?;
    let right = read_operand(state, record.mode2, record.payload2)?;
    let result = f(left, right)?;
    write_operand(state, record.mode1, record.payload1, result)
}

/// `CMP left, right`: sets the flag registers as if-else in order. Only the
/// equal branch clears the other flags; the VM never clears flags outside
/// `CMP`.
pub fn cmp(state: &mut VmState, record: &DecodedRecord) -> Result<(), RuntimeError> {
    let left = read_operand(state, record.mode1, record.payload1)?;
    let right = read_operand(state, record.mode2, record.payload2)?;

    if left > right {
        set_flag(state, RegisterId::GT, 1);
        set_flag(state, RegisterId::NE, 1);
    } else if left < right {
        set_flag(state, RegisterId::LT, 1);
        set_flag(state, RegisterId::NE, 1);
    } else {
        set_flag(state, RegisterId::EQ, 1);
        set_flag(state, RegisterId::LT, 0);
        set_flag(state, RegisterId::GT, 0);
        set_flag(state, RegisterId::NE, 0);
    }

    Ok(())
}

fn set_flag(state: &mut VmState, register: RegisterId, value: i64) {
    state.registers[register.index()] = value;
}

/// Realizes the jump family: operand 1 is a label index, which must be
/// registered whether or not `cond` is true. If `cond` holds, the pointer
/// is set to the label's own offset; the executor's uniform +12 advance
/// then lands just past the `LABEL` instruction.
pub fn jump_if(
    state: &mut VmState,
    record: &DecodedRecord,
    cond: impl Fn(&VmState) -> bool,
) -> Result<(), RuntimeError> {
    let label_index = record.payload1;
    let offset = *state
        .labels
        .get(&label_index)
        .ok_or(RuntimeError::BadLabel(label_index))?;

    if cond(state) {
        state.ip = offset;
    }

    Ok(())
}

/// Registers a label's byte offset the first time it is seen, during
/// either the pre-pass or (harmlessly, a no-op by then) normal execution.
pub fn label(state: &mut VmState, record: &DecodedRecord, offset: usize) {
    state.labels.entry(record.payload1).or_insert(offset);
}

pub fn print(state: &VmState, record: &DecodedRecord) -> Result<(), RuntimeError> {
    let value = read_operand(state, record.mode1, record.payload1)?;
    println!("VM PRINT: {}", value);
    Ok(())
}

pub fn input(state: &mut VmState, record: &DecodedRecord) -> Result<(), RuntimeError> {
    if !matches!(record.mode1, OperandMode::Register | OperandMode::RegisterPointer) {
        return Err(RuntimeError::BadArgument(record.mode1));
    }

    loop {
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::Io(e.to_string()))?;

        match line.trim().parse::<i64>() {
            Ok(value) => return write_operand(state, record.mode1, record.payload1, value),
            Err(_) => log::debug!("input {:?} did not parse as an integer, retrying", line.trim()),
        }
    }
}
