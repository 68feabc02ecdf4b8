//! Statement-level checks on migration bodies

use sqlparser::dialect::DuckDbDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Leading keywords of statements that open or close a transaction
const TRANSACTION_KEYWORDS: &[&str] = &["BEGIN", "START", "COMMIT", "END", "ROLLBACK", "ABORT"];

/// First transaction-control keyword that starts a statement in `body`.
///
/// Comments and string literals are skipped. A body the tokenizer cannot
/// read yields `None`; DuckDB reports it when the body runs.
pub(crate) fn transaction_control(body: &str) -> Option<String> {
    let dialect = DuckDbDialect {};
    let tokens = Tokenizer::new(&dialect, body).tokenize().ok()?;

    let mut statement_start = true;
    for token in tokens {
        match token {
            Token::Whitespace(_) => {}
            Token::SemiColon => statement_start = true,
            Token::Word(word) if statement_start => {
                if word.quote_style.is_none()
                    && TRANSACTION_KEYWORDS
                        .iter()
                        .any(|keyword| word.value.eq_ignore_ascii_case(keyword))
                {
                    return Some(word.value.to_ascii_uppercase());
                }
                statement_start = false;
            }
            _ => statement_start = false,
        }
    }
    None
}

#[cfg(test)]
#[path = "statements_test.rs"]
mod tests;
