use std::error;

use bibparse::{BibError, Database, Entry, FieldValue};

const SRC: &str = r#"% Bibliography of the reading group
@PREAMBLE{"\newcommand{\noop}[1]{}"}

@Collection{tolkien:lotr,            % referenced below
    editor    = {Christopher Tolkien},
    title     = {The Lord of the Rings},
    publisher = {Allen {\&} Unwin and Houghton Mifflin},
    year      = {1954}
}

@book{tolkien1937,
    Author    = {J. R. R. Tolkien},
    title     = {The {H}obbit, or There and Back Again},
    crossref  = {tolkien:lotr},
    keywords  = {fantasy   dragons
                 adventure},
    bib-source = {{local copy}}, % the hyphen is dropped from the name
    note      = {first edition has 100% of the maps}
}

@article{k1, author = {Doe, J. and Roe, R.}, pages = {12-15}}

@misc{bare,
}
"#;

type Snapshot = Vec<(Option<String>, String, Option<String>, Vec<(String, FieldValue)>)>;

/// Everything a database holds, independent of iteration and field order
fn snapshot(db: &Database) -> Snapshot {
    let mut entries: Snapshot = db
        .iter()
        .map(|entry| {
            let mut fields: Vec<(String, FieldValue)> = entry
                .fields()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            (
                entry.id().map(str::to_string),
                entry.kind().to_string(),
                entry.preamble_text().map(str::to_string),
                fields,
            )
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn list(items: &[&str]) -> FieldValue {
    FieldValue::List(items.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_parse_whole_file() -> Result<(), Box<dyn error::Error>> {
    let db = Database::parse(SRC)?;
    assert_eq!(db.len(), 5);
    assert_eq!(db.preamble(), Some(r#""\newcommand{\noop}[1]{}""#));

    let lotr = db.get("tolkien:lotr").ok_or("missing collection")?;
    assert_eq!(lotr.kind(), "collection");
    assert_eq!(
        lotr.get("publisher"),
        Some(&list(&["Allen {\\&} Unwin", "Houghton Mifflin"]))
    );

    let hobbit = db.get("tolkien1937").ok_or("missing book")?;
    assert_eq!(hobbit.get("author"), Some(&list(&["J. R. R. Tolkien"])));
    assert_eq!(hobbit.get("keywords"), Some(&list(&["fantasy", "dragons", "adventure"])));
    assert_eq!(
        hobbit.get("bibsource"),
        Some(&FieldValue::Scalar("{local copy}".to_string()))
    );
    assert_eq!(
        hobbit.raw("note").as_deref(),
        Some("first edition has 100% of the maps")
    );

    let bare = db.get("bare").ok_or("missing misc")?;
    assert_eq!(bare.fields().count(), 0);
    Ok(())
}

#[test]
fn test_example_entry() -> Result<(), Box<dyn error::Error>> {
    let db = Database::parse("@article{k1, author = {Doe, J. and Roe, R.}, pages = {12-15}}")?;
    let entry = db.get("k1").ok_or("missing entry")?;
    assert_eq!(entry.kind(), "article");
    assert_eq!(entry.get("author"), Some(&list(&["Doe, J.", "Roe, R."])));
    assert_eq!(entry.get("pages"), Some(&list(&["12", "15"])));

    let out = db.serialize();
    assert!(out.contains("author = {Doe, J. and Roe, R.}"));
    assert!(out.contains("pages = {12-15}"));
    Ok(())
}

#[test]
fn test_reparse_keeps_content() -> Result<(), Box<dyn error::Error>> {
    let first = Database::parse(SRC)?;
    let second = Database::parse(&first.serialize())?;
    assert_eq!(snapshot(&first), snapshot(&second));

    let third = Database::parse(&second.serialize_unordered())?;
    assert_eq!(snapshot(&first), snapshot(&third));
    Ok(())
}

#[test]
fn test_serialization_is_stable() -> Result<(), Box<dyn error::Error>> {
    let once = Database::parse(SRC)?.serialize();
    let twice = Database::parse(&once)?.serialize();
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn test_collections_come_last() -> Result<(), Box<dyn error::Error>> {
    let out = Database::parse(SRC)?.serialize();
    assert!(out.starts_with("@preamble{"));
    let book = out.find("@book{tolkien1937,").ok_or("missing book")?;
    let collection = out.find("@collection{tolkien:lotr,").ok_or("missing collection")?;
    assert!(book < collection);
    assert!(out.ends_with("year = {1954}\n}"));
    Ok(())
}

#[test]
fn test_non_canonical_separators_are_normalized() -> Result<(), Box<dyn error::Error>> {
    let db = Database::parse("@misc{m, keywords = {a \t b\n c}}")?;
    assert!(db.serialize().contains("    keywords = {a b c}"));
    Ok(())
}

#[test]
fn test_type_queries() -> Result<(), Box<dyn error::Error>> {
    let db = Database::parse(SRC)?;
    let others = db.by_type(&["collection"], true);
    let mut ids: Vec<_> = others.iter().map(|entry| entry.id().unwrap_or_default()).collect();
    ids.sort();
    assert_eq!(ids, ["", "bare", "k1", "tolkien1937"]);
    assert!(others.iter().all(|entry| entry.kind() != "collection"));
    Ok(())
}

#[test]
fn test_errors_abort_parsing() {
    let dup = "@book{a, title = {1}}\n@book{b, title = {2}}\n@misc{a, note = {3}}";
    assert!(matches!(Database::parse(dup), Err(BibError::DuplicateIdentifier(id)) if id == "a"));

    let preambles = "@preamble{one}\n@book{a, title = {1}}\n@Preamble{two}";
    assert!(matches!(Database::parse(preambles), Err(BibError::DuplicatePreamble)));

    assert!(matches!(
        Database::parse("@book{title = {no id}}"),
        Err(BibError::MissingIdentifier(_))
    ));
    assert!(matches!(Database::parse("@book{}"), Err(BibError::MissingIdentifier(_))));
}

#[test]
fn test_built_by_hand() -> Result<(), Box<dyn error::Error>> {
    let mut entry = Entry::new("InProceedings", "knuth84")?;
    entry.set_raw("author", "Donald E. Knuth")?;
    entry.set_raw("title", "Literate Programming")?;
    entry.set("pages", list(&["97", "111"]))?;

    let mut db = Database::new();
    db.insert(entry.clone())?;
    assert!(matches!(db.insert(entry), Err(BibError::DuplicateIdentifier(_))));
    assert_eq!(
        db.serialize(),
        "@inproceedings{knuth84,\n    author = {Donald E. Knuth},\n    title = {Literate Programming},\n    pages = {97-111}\n}"
    );
    Ok(())
}

#[test]
fn test_built_by_hand_keeps_shape() -> Result<(), Box<dyn error::Error>> {
    let mut entry = Entry::new("book", "gof94")?;
    entry.set("author", FieldValue::Scalar("Gamma, E. and Helm, R.".into()))?;
    entry.set("keywords", FieldValue::Scalar("patterns  oop".into()))?;
    assert!(matches!(
        entry.set("title", list(&["Design", "Patterns"])),
        Err(BibError::InvalidField(_))
    ));

    let db = Database::from_entries(vec![entry.clone()])?;
    let again = Database::parse(&db.serialize())?;
    assert_eq!(again.get("gof94"), Some(&entry));
    assert_eq!(entry.get("author"), Some(&list(&["Gamma, E.", "Helm, R."])));

    assert!(matches!(Entry::new("misc", "a,b"), Err(BibError::InvalidIdentifier(_))));
    assert!(matches!(Entry::new("misc", " "), Err(BibError::MissingIdentifier(_))));
    Ok(())
}
