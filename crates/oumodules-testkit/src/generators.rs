//! Proptest generators for property-based testing.

use proptest::prelude::*;

use oumodules_core::{CodeCatalog, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a module-style code, in mixed case.
pub fn module_code() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,6}[0-9]{1,3}(-[a-zA-Z]{1,5})?".prop_map(String::from)
}

/// Generate filler text that can never contain a code.
///
/// No digits, and no `q` or `d` so the `QD` token cannot appear.
pub fn filler() -> impl Strategy<Value = String> {
    "[abce-pr-zABCE-PR-Z ,.&!?]{0,20}".prop_map(String::from)
}

/// Generate a message made of codes separated by filler.
pub fn message_with_codes(max_codes: usize) -> impl Strategy<Value = (String, Vec<String>)> {
    prop::collection::vec(module_code(), 0..=max_codes).prop_flat_map(|codes| {
        let n = codes.len();
        prop::collection::vec(filler(), n + 1).prop_map(move |fillers| {
            let mut text = String::new();
            for (i, code) in codes.iter().enumerate() {
                text.push_str(&fillers[i]);
                // Keep codes apart so neighbours cannot merge.
                text.push(' ');
                text.push_str(code);
                text.push(' ');
            }
            text.push_str(&fillers[n]);
            (text, codes.clone())
        })
    })
}

/// A catalog containing every given code.
pub fn catalog_for(codes: &[String]) -> CodeCatalog {
    CodeCatalog::from_entries(
        codes
            .iter()
            .map(|c| (c.as_str(), format!("Course {}", c.to_ascii_uppercase()), None)),
    )
}
