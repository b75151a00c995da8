//! Thin wrapper over `rustpython-parser`
//!
//! Used to check whether a candidate fix is valid Python and to read
//! subscript and operand expressions.

use rustpython_parser::ast::{Expr, Mod, ModExpression};
use rustpython_parser::{parse, Mode};

pub type ParseError = String;

pub fn parse_module(source: &str) -> Result<Mod, ParseError> {
    parse(source, Mode::Module, "<string>").map_err(|e| format!("Parse error: {}", e))
}

pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    match parse(source, Mode::Expression, "<string>") {
        Ok(Mod::Expression(ModExpression { body, .. })) => Ok(*body),
        Ok(_) => Err("Expected expression".to_string()),
        Err(e) => Err(format!("Parse error: {}", e)),
    }
}

/// True when `source` parses as a module.
pub fn is_valid_module(source: &str) -> bool {
    parse_module(source).is_ok()
}
