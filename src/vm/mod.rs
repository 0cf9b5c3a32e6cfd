mod executor;
pub(crate) mod handlers;

use std::collections::HashMap;

use thiserror::Error;

use crate::constants::REGISTER_COUNT;
use crate::dictionary::OperandMode;
use crate::encoder::DecodeError;

pub use executor::execute;

/// Failures raised while dispatching a decoded instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("operand mode {0:?} cannot be used here")]
    BadArgument(OperandMode),
    #[error("jump to unregistered label {0}")]
    BadLabel(i32),
    #[error("division by zero")]
    DivisionByZero,
    #[error("memory address {0} out of range [0, {1})")]
    BadMemoryAccess(i64, usize),
    #[error("failed to read input: {0}")]
    Io(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The mutable execution record for one run: registers, linear memory, the
/// instruction pointer, the bytecode buffer, and the label-index table.
///
/// A `VmState` is created per `execute` invocation and discarded at the end
/// of the run. The label table is populated once during the pre-pass and is
/// read-only afterward; memory is never reset between operations.
pub struct VmState {
    pub registers: [i64; REGISTER_COUNT],
    pub memory: Vec<i64>,
    pub ip: usize,
    pub labels: HashMap<i32, usize>,
    pub halted: bool,
}

impl VmState {
    pub fn new(memory_size: usize) -> VmState {
        VmState {
            registers: [0; REGISTER_COUNT],
            memory: vec![0; memory_size],
            ip: 0,
            labels: HashMap::new(),
            halted: false,
        }
    }
}
