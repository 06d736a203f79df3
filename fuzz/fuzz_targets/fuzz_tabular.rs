#![no_main]

use glossa::tabular::Table;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // CSV may reject unterminated quotes; it must never panic.
    if let Ok(table) = Table::parse_csv(text, ',') {
        // Whatever parsed must re-serialize, and the wire form must not
        // crash the parser either.
        let wire = table.to_delimited(',', true);
        let _ = Table::parse_csv(&wire, ',');
    }

    // TSV parsing is infallible by contract.
    let table = Table::parse_tsv(text);
    let _ = table.to_delimited('\t', false);
});
