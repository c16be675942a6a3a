//! Athena: SQL queries over security lake tables, and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;

pub use consts::athena_details;
pub use cti::AthenaCti;
pub use mapping::athena_mappings;

use crate::platforms::base::sql::{SqlParser, SqlQueryRender, SqlRegexStyle};

pub fn athena_parser() -> SqlParser {
    SqlParser::new(athena_details(), athena_mappings())
}

pub fn athena_query_render() -> SqlQueryRender {
    SqlQueryRender::new(
        athena_details(),
        athena_mappings(),
        "LIKE",
        SqlRegexStyle::RegexpLike,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer, OperatorKind, SiemContainer, Token, Value};
    use crate::render::QueryRender;

    #[test]
    fn regex_renders_as_regexp_like() {
        let container = SiemContainer::new(
            vec![Token::FieldValue(FieldValue::new(
                "command_line",
                Identifier::op(OperatorKind::Regex),
                Value::Str("enc.*".to_string()),
            ))],
            MetaInfoContainer::default(),
        );
        let output = athena_query_render().generate(&container).unwrap();
        assert!(output.text.contains("REGEXP_LIKE(command_line, 'enc.*')"));
    }
}
