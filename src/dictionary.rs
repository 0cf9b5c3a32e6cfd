use num::traits::{FromPrimitive, ToPrimitive};
use num_derive::{FromPrimitive, ToPrimitive};
use rega_util::EnumFromStr;
use rega_util_derive::EnumFromStr;

/// Arity class of a [`Mnemonic`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpType {
    Nop,
    Unary,
    Binary,
}

/// Every instruction the machine understands.
///
/// Variant order is the wire format: the discriminant *is* the opcode
/// emitted by the encoder and expected by the executor. Reordering these
/// variants changes the bytecode contract, not just the source code.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum Mnemonic {
    // Binary
    ADD = 0,
    SUB = 1,
    MUL = 2,
    DIV = 3,
    AND = 4,
    OR = 5,
    XOR = 6,
    MOV = 7,
    CMP = 8,
    // Unary
    NOT = 9,
    JMP = 10,
    JMP_EQ = 11,
    JMP_GT = 12,
    JMP_LT = 13,
    JMP_NE = 14,
    LABEL = 15,
    PRINT = 16,
    INPUT = 17,
    CALL = 18,
    // Nop-arity
    NOP = 19,
    END = 20,
    RET = 21,
}

impl Mnemonic {
    pub fn op_type(self) -> OpType {
        match self {
            Mnemonic::ADD
            | Mnemonic::SUB
            | Mnemonic::MUL
            | Mnemonic::DIV
            | Mnemonic::AND
            | Mnemonic::OR
            | Mnemonic::XOR
            | Mnemonic::MOV
            | Mnemonic::CMP => OpType::Binary,
            Mnemonic::NOT
            | Mnemonic::JMP
            | Mnemonic::JMP_EQ
            | Mnemonic::JMP_GT
            | Mnemonic::JMP_LT
            | Mnemonic::JMP_NE
            | Mnemonic::LABEL
            | Mnemonic::PRINT
            | Mnemonic::INPUT
            | Mnemonic::CALL => OpType::Unary,
            Mnemonic::NOP | Mnemonic::END | Mnemonic::RET => OpType::Nop,
        }
    }

    pub fn opcode(self) -> i16 {
        self.to_i16().unwrap()
    }

    pub fn from_opcode(opcode: i16) -> Option<Mnemonic> {
        FromPrimitive::from_i16(opcode)
    }

    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Mnemonic::JMP
                | Mnemonic::JMP_EQ
                | Mnemonic::JMP_GT
                | Mnemonic::JMP_LT
                | Mnemonic::JMP_NE
        )
    }
}

/// The nine named registers, addressed by their wire index.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum RegisterId {
    r1 = 0,
    r2 = 1,
    r3 = 2,
    r4 = 3,
    A = 4,
    EQ = 5,
    LT = 6,
    GT = 7,
    NE = 8,
}

impl RegisterId {
    pub fn index(self) -> usize {
        self.to_usize().unwrap()
    }

    pub fn from_index(index: usize) -> Option<RegisterId> {
        FromPrimitive::from_usize(index)
    }
}

/// How an operand's payload is interpreted at execution time. These
/// discriminants are the wire tags used by the bytecode encoder/decoder.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum OperandMode {
    Nop = 0,
    Label = 1,
    Register = 2,
    RegisterPointer = 3,
    InPlaceValue = 4,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opcode_is_stable_enumeration_order() {
        assert_eq!(Mnemonic::ADD.opcode(), 0);
        assert_eq!(Mnemonic::CMP.opcode(), 8);
        assert_eq!(Mnemonic::NOT.opcode(), 9);
        assert_eq!(Mnemonic::CALL.opcode(), 18);
        assert_eq!(Mnemonic::NOP.opcode(), 19);
        assert_eq!(Mnemonic::RET.opcode(), 21);
    }

    #[test]
    fn opcode_round_trips_through_from_opcode() {
        for opcode in 0..=21i16 {
            let mnemonic = Mnemonic::from_opcode(opcode).unwrap();
            assert_eq!(mnemonic.opcode(), opcode);
        }
    }

    #[test]
    fn mnemonic_parses_from_its_own_name() {
        assert_eq!("JMP_EQ".parse::<Mnemonic>().unwrap(), Mnemonic::JMP_EQ);
        assert!("jmp_eq".parse::<Mnemonic>().is_err());
    }

    #[test]
    fn op_type_groups_match_canonical_order() {
        assert_eq!(Mnemonic::ADD.op_type(), OpType::Binary);
        assert_eq!(Mnemonic::NOT.op_type(), OpType::Unary);
        assert_eq!(Mnemonic::NOP.op_type(), OpType::Nop);
    }

    #[test]
    fn register_index_round_trips() {
        for index in 0..9usize {
            let id = RegisterId::from_index(index).unwrap();
            assert_eq!(id.index(), index);
        }
        assert_eq!("A".parse::<RegisterId>().unwrap(), RegisterId::A);
    }
}
