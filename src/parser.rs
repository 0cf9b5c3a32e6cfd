use std::collections::HashMap;

use thiserror::Error;

use crate::constants::FIRST_LABEL_INDEX;
use crate::dictionary::{Mnemonic, OpType, RegisterId};
use crate::encoder::{ParsedOperand, ParsedOperation};

/// Failure kinds raised while parsing a single line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown instruction \"{0}\"")]
    BadOperationIdentifier(String),
    #[error("bad operand \"{0}\"")]
    BadOperationArgument(String),
    #[error("bad in-place value \"{0}\"")]
    BadInPlaceValue(String),
}

/// Wraps a [`ParseError`] with the context of the line that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error \"{cause}\" at line {line_index}, {line_text}")]
pub struct ParsingError {
    pub line_index: usize,
    pub line_text: String,
    #[source]
    pub cause: ParseError,
}

/// Interns label names to small integer indices in first-seen order.
/// Index 0 is reserved, so the first label encountered gets index 1.
#[derive(Default, Debug, Clone)]
pub struct LabelTable {
    indices: HashMap<String, i32>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        Default::default()
    }

    /// Returns the label index for `name`, assigning a fresh one on first
    /// encounter.
    pub fn resolve(&mut self, name: &str) -> i32 {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = FIRST_LABEL_INDEX + self.indices.len() as i32;
        self.indices.insert(name.to_string(), index);
        index
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn is_label_mnemonic(mnemonic: Mnemonic) -> bool {
    mnemonic == Mnemonic::LABEL || mnemonic.is_jump()
}

fn parse_operand(
    token: &str,
    mnemonic: Mnemonic,
    labels: &mut LabelTable,
) -> Result<ParsedOperand, ParseError> {
    let (pointer, name) = match token.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    if let Ok(register) = name.parse::<RegisterId>() {
        let mode = if pointer {
            crate::dictionary::OperandMode::RegisterPointer
        } else {
            crate::dictionary::OperandMode::Register
        };
        return Ok(ParsedOperand {
            mode,
            payload: register.index() as i64,
        });
    }

    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        return name
            .parse::<i64>()
            .map(|value| ParsedOperand {
                mode: crate::dictionary::OperandMode::InPlaceValue,
                payload: value,
            })
            .map_err(|_| ParseError::BadInPlaceValue(token.to_string()));
    }

    if is_label_mnemonic(mnemonic) {
        let index = labels.resolve(name);
        return Ok(ParsedOperand {
            mode: crate::dictionary::OperandMode::Label,
            payload: i64::from(index),
        });
    }

    Err(ParseError::BadOperationArgument(token.to_string()))
}

fn parse_line(
    raw_line: &str,
    labels: &mut LabelTable,
) -> Result<Option<ParsedOperation>, ParseError> {
    let line = raw_line.trim_start();
    let line = match line.find(';') {
        Some(index) => &line[..index],
        None => line,
    };
    let line = line.trim_end();

    if line.is_empty() {
        return Ok(None);
    }

    let without_commas = line.replace(',', "");
    let mut tokens = without_commas.split_whitespace();
    let mnemonic_token = tokens.next().expect("non-empty line yields at least one token");

    let mnemonic: Mnemonic = mnemonic_token
        .parse()
        .map_err(|_| ParseError::BadOperationIdentifier(mnemonic_token.to_string()))?;

    let operand_tokens: Vec<&str> = tokens.collect();

    let operation = match mnemonic.op_type() {
        OpType::Nop => ParsedOperation {
            mnemonic,
            operand1: ParsedOperand::NOP,
            operand2: ParsedOperand::NOP,
        },
        OpType::Unary => {
            let token = operand_tokens.first().copied().unwrap_or("");
            let operand = parse_operand(token, mnemonic, labels)?;
            if mnemonic == Mnemonic::NOT {
                // Both slots bound to the same operand so the binary
                // handler path can service `x := ~x`.
                ParsedOperation {
                    mnemonic,
                    operand1: operand,
                    operand2: operand,
                }
            } else {
                ParsedOperation {
                    mnemonic,
                    operand1: operand,
                    operand2: ParsedOperand::NOP,
                }
            }
        }
        OpType::Binary => {
            let token1 = operand_tokens.first().copied().unwrap_or("");
            let token2 = operand_tokens.get(1).copied().unwrap_or("");
            let operand1 = parse_operand(token1, mnemonic, labels)?;
            let operand2 = parse_operand(token2, mnemonic, labels)?;
            ParsedOperation {
                mnemonic,
                operand1,
                operand2,
            }
        }
    };

    Ok(Some(operation))
}

/// Parses a complete source string into an ordered list of operations.
pub fn parse(source: &str) -> Result<Vec<ParsedOperation>, ParsingError> {
    let mut labels = LabelTable::new();
    let mut operations = Vec::new();

    for (line_index, raw_line) in source.lines().enumerate() {
        log::trace!("parsing line {}: {:?}", line_index, raw_line);
        match parse_line(raw_line, &mut labels) {
            Ok(Some(operation)) => operations.push(operation),
            Ok(None) => {}
            Err(cause) => {
                return Err(ParsingError {
                    line_index,
                    line_text: raw_line.to_string(),
                    cause,
                })
            }
        }
    }

    Ok(operations)
}
