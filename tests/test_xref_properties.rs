//! Property tests for rebuilt cross-reference tables.
//!
//! Bodies are generated from object definitions whose filler text cannot
//! contain digits or the letter `x`, so no stray headers or `xref` tokens
//! appear outside the generated headers.

use pdf_xref_fix::{rebuild, XrefRebuilder};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ObjectDef {
    number: u32,
    generation: u32,
    filler: String,
    catalog: bool,
}

fn object_def() -> impl Strategy<Value = ObjectDef> {
    (1u32..200, 0u32..4, "[a-w ]{0,24}", prop::bool::weighted(0.1)).prop_map(
        |(number, generation, filler, catalog)| ObjectDef {
            number,
            generation,
            filler,
            catalog,
        },
    )
}

/// Build a body and the expected last-wins offset per object number.
fn build_body(defs: &[ObjectDef]) -> (Vec<u8>, HashMap<u32, (u64, u32)>, Option<u32>) {
    let mut body = b"%PDF-1.4\n".to_vec();
    let mut expected = HashMap::new();
    let mut root = None;

    for def in defs {
        expected.insert(def.number, (body.len() as u64, def.generation));
        body.extend_from_slice(format!("{} {} obj\n", def.number, def.generation).as_bytes());
        if def.catalog {
            root.get_or_insert(def.number);
            body.extend_from_slice(format!("<< /Type /Catalog /Note ({}) >>\n", def.filler).as_bytes());
        } else {
            body.extend_from_slice(format!("<< /Note ({}) >>\n", def.filler).as_bytes());
        }
        body.extend_from_slice(b"endobj\n");
    }

    (body, expected, root)
}

/// The `xref` section text, from the keyword up to the blank line.
fn xref_section(pdf: &[u8], startxref: u64) -> String {
    let text = String::from_utf8_lossy(&pdf[startxref as usize..]);
    let end = text.find("\n\ntrailer").unwrap();
    text[..end + 1].to_string()
}

proptest! {
    #[test]
    fn prop_size_is_max_number_plus_one(defs in prop::collection::vec(object_def(), 0..20)) {
        let (body, _, _) = build_body(&defs);
        let report = XrefRebuilder::new().analyze(&body).unwrap();
        let max = defs.iter().map(|d| d.number).max().unwrap_or(0);
        prop_assert_eq!(report.trailer.size, u64::from(max) + 1);
    }

    #[test]
    fn prop_table_has_size_entries(defs in prop::collection::vec(object_def(), 0..20)) {
        let (body, _, _) = build_body(&defs);
        let (pdf, report) = XrefRebuilder::new().rebuild_with_report(&body).unwrap();
        let section = xref_section(&pdf, report.startxref);
        let lines: Vec<&str> = section.lines().collect();

        prop_assert_eq!(lines[0], "xref");
        prop_assert_eq!(lines[1].to_string(), format!("0 {}", report.trailer.size));
        prop_assert_eq!(lines.len() as u64 - 2, report.trailer.size);
        prop_assert_eq!(lines[2], "0000000000 65535 f ");
    }

    #[test]
    fn prop_offsets_match_headers(defs in prop::collection::vec(object_def(), 1..20)) {
        let (body, expected, _) = build_body(&defs);
        let (pdf, report) = XrefRebuilder::new().rebuild_with_report(&body).unwrap();
        let section = xref_section(&pdf, report.startxref);

        for (number, line) in section.lines().skip(2).enumerate() {
            let number = number as u32;
            match expected.get(&number) {
                Some(&(offset, generation)) => {
                    prop_assert_eq!(line.to_string(), format!("{:010} {:05} n ", offset, generation));
                    let header = format!("{} {} obj", number, generation);
                    prop_assert!(pdf[offset as usize..].starts_with(header.as_bytes()));
                },
                None => prop_assert_eq!(line, "0000000000 65535 f "),
            }
        }
    }

    #[test]
    fn prop_startxref_is_body_len_plus_one(defs in prop::collection::vec(object_def(), 0..20)) {
        let (body, _, _) = build_body(&defs);
        let pdf = rebuild(&body).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        let expected = format!("\nstartxref\n{}\n%%EOF\n", body.len() + 1);
        prop_assert!(text.ends_with(&expected));
    }

    #[test]
    fn prop_root_is_first_catalog(defs in prop::collection::vec(object_def(), 0..20)) {
        let (body, _, root) = build_body(&defs);
        let report = XrefRebuilder::new().analyze(&body).unwrap();
        prop_assert_eq!(report.trailer.root, root);
    }

    #[test]
    fn prop_rebuild_is_idempotent(defs in prop::collection::vec(object_def(), 0..20)) {
        let (body, _, _) = build_body(&defs);
        let rebuilder = XrefRebuilder::new();

        let (once, first) = rebuilder.rebuild_with_report(&body).unwrap();
        let (twice, second) = rebuilder.rebuild_with_report(&once).unwrap();

        prop_assert_eq!(xref_section(&once, first.startxref), xref_section(&twice, second.startxref));
        prop_assert_eq!(first.trailer, second.trailer);
        prop_assert_eq!(rebuilder.rebuild(&twice).unwrap(), twice);
    }
}
