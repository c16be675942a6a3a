#![no_main]

use libfuzzer_sys::fuzz_target;
use ruleshift_core::platforms::base::{kql, lucene, spl, sql};

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let _ = spl::spl_tokenizer().tokenize(query);
        let _ = kql::kql_tokenizer().tokenize(query);
        let _ = lucene::lucene_tokenizer().tokenize(query);
        let _ = sql::sql_tokenizer().tokenize(query);
    }
});
