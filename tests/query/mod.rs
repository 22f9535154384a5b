//! End-to-end tests for the query entry points
//!
//! These run the whole import-and-execute pipeline through the library API.

use crate::helpers::{assert_match, create_file, create_foo_bar, create_temp_dir};

use querycsv::{
    import_csv, import_dataset, query_csv, query_csv_file, query_sqlite, query_sqlite_file,
    CsvInput, Dataset, ImportOptions, ImportOutcome, QueryCsvError, Store, StoreHandle,
    StoreLocation, Value,
};

fn memory() -> StoreHandle<'static> {
    StoreHandle::open(StoreLocation::Memory).unwrap()
}

fn animals() -> Dataset {
    Dataset::from_rows(
        "animals",
        vec![
            vec!["name", "number"],
            vec!["cat", "1"],
            vec!["dog", "2"],
            vec!["bird", "3"],
        ],
    )
    .unwrap()
}

#[test]
fn test_query_csv_single_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;

    let result = query_csv(
        &["select * from foo"],
        &[CsvInput::new(foo)],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_match(
        &result,
        "
        a, b, c
        1, 2, 3
        ",
    );
    Ok(())
}

#[test]
fn test_query_csv_multiple_tables() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, bar) = create_foo_bar(dir.path())?;

    let result = query_csv(
        &["select * from foo union all select * from bar"],
        &[CsvInput::new(foo), CsvInput::new(bar)],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_match(
        &result,
        "
        a, b, c
        1, 2, 3
        4, 5, 6
        ",
    );
    Ok(())
}

#[test]
fn test_query_csv_multiple_commands() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;

    let result = query_csv(
        &["update foo set a=(a+b+c)", "select a from foo"],
        &[CsvInput::new(foo)],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_match(
        &result,
        "
        a
        6
        ",
    );
    Ok(())
}

#[test]
fn test_query_csv_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;
    let script = create_file(
        dir.path(),
        "query1.sql",
        "-- add the columns up\nupdate foo set a=(a+b+c);\nselect a from foo;",
    )?;

    let result = query_csv_file(
        &script,
        &[CsvInput::new(foo)],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_match(
        &result,
        "
        a
        6
        ",
    );
    Ok(())
}

#[test]
fn test_script_with_empty_statements() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;
    let script = create_file(dir.path(), "gaps.sql", ";\nselect c from foo;\n;\n")?;

    let result = query_csv_file(
        &script,
        &[CsvInput::new(foo)],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_eq!(result.column_count(), 0);
    assert_eq!(result.row_count(), 0);

    let result = query_sqlite(&[";", "select 1;"], memory())?;
    assert_eq!(result.rows(), &[vec![Value::Integer(1)]]);
    Ok(())
}

#[test]
fn test_query_csv_explicit_table_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;

    let result = query_csv(
        &["select c from numbers"],
        &[CsvInput::new(foo).with_table_name("numbers")],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_eq!(result.rows(), &[vec![Value::from("3")]]);
    Ok(())
}

#[test]
fn test_query_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;
    let db = dir.path().join("db.sqlite3");

    let store = Store::open_file(&db)?;
    import_csv(
        &store,
        &CsvInput::new(foo).with_table_name("foo2"),
        &ImportOptions::default(),
    )?;
    store.close()?;

    let result = query_sqlite(
        &["select * from foo2"],
        StoreHandle::open(StoreLocation::File(db))?,
    )?;
    assert_match(
        &result,
        "
        a, b, c
        1, 2, 3
        ",
    );
    Ok(())
}

#[test]
fn test_query_sqlite_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let script = create_file(
        dir.path(),
        "script.sql",
        "create table t (x);\ninsert into t values (1);\ninsert into t\n  values (2);\nselect sum(x) as total\n  from t;\n",
    )?;

    let store = Store::open_in_memory()?;
    let result = query_sqlite_file(&script, StoreHandle::borrowed(&store))?;
    assert_eq!(result.header(), &["total".to_string()]);
    assert_eq!(result.rows(), &[vec![Value::Integer(3)]]);

    // the borrowed store is still usable
    assert!(store.has_table("t")?);
    Ok(())
}

#[test]
fn test_import_skips_existing_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, bar) = create_foo_bar(dir.path())?;
    let store = Store::open_file(dir.path().join("db.sqlite3"))?;

    import_csv(&store, &CsvInput::new(&foo).with_table_name("tmp"), &ImportOptions::default())?;
    let outcome = import_csv(
        &store,
        &CsvInput::new(&bar).with_table_name("tmp"),
        &ImportOptions::default(),
    )?;
    assert_eq!(
        outcome,
        ImportOutcome::Skipped {
            table: "tmp".to_string()
        }
    );

    let result = query_sqlite(&["select * from tmp"], StoreHandle::borrowed(&store))?;
    assert_match(
        &result,
        "
        a, b, c
        1, 2, 3
        ",
    );
    Ok(())
}

#[test]
fn test_import_overwrites_existing_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, bar) = create_foo_bar(dir.path())?;
    let store = Store::open_file(dir.path().join("db.sqlite3"))?;

    import_csv(&store, &CsvInput::new(&foo).with_table_name("tmp"), &ImportOptions::default())?;
    let overwrite = ImportOptions {
        overwrite: true,
        ..ImportOptions::default()
    };
    import_csv(&store, &CsvInput::new(&bar).with_table_name("tmp"), &overwrite)?;

    let result = query_sqlite(&["select * from tmp"], StoreHandle::borrowed(&store))?;
    assert_match(
        &result,
        "
        a, b, c
        4, 5, 6
        ",
    );
    Ok(())
}

#[test]
fn test_query_array_file_store() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let db = dir.path().join("db.sqlite3");

    let store = Store::open_file(&db)?;
    import_dataset(&store, &animals(), "result", false)?;
    store.close()?;

    let result = query_sqlite(
        &["select * from result where name = 'dog'"],
        StoreHandle::open(StoreLocation::File(db))?,
    )?;
    assert_eq!(result.header(), &["name".to_string(), "number".to_string()]);
    assert_eq!(result.rows(), &[vec![Value::from("dog"), Value::from("2")]]);
    Ok(())
}

#[test]
fn test_query_array_memory_store() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open_in_memory()?;
    import_dataset(&store, &animals(), "result", false)?;

    let result = query_sqlite(
        &["select * from result where name = 'dog'"],
        StoreHandle::borrowed(&store),
    )?;
    assert_eq!(result.rows(), &[vec![Value::from("dog"), Value::from("2")]]);
    Ok(())
}

#[test]
fn test_dataset_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Dataset::from_rows(
        "quotes",
        vec![
            vec!["order", "note", "empty"],
            vec!["2", "it's \"fine\"", ""],
            vec!["1", "comma, inside", ""],
            vec!["3", "  padded  ", "x"],
        ],
    )?;

    let store = Store::open_in_memory()?;
    import_dataset(&store, &dataset, "quotes", false)?;
    let result = query_sqlite(&["select * from quotes"], StoreHandle::borrowed(&store))?;

    assert_eq!(result.header(), dataset.header());
    assert_eq!(result.text_rows(), dataset.rows());
    Ok(())
}

#[test]
fn test_csv_file_round_trip_with_quotes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let input = create_file(
        dir.path(),
        "people.csv",
        "\"id\";\"full name\";\"city\"\n1;\"Doe; Jane\";\"Paris\"\n2;\"O'Hara, Scarlett\";\"Tara\"\n",
    )?;

    let result = query_csv(
        &["select * from people"],
        &[CsvInput::new(input)],
        memory(),
        &ImportOptions::default(),
    )?;
    assert_eq!(
        result.header(),
        &["id".to_string(), "full name".to_string(), "city".to_string()]
    );
    assert_eq!(
        result.text_rows(),
        vec![
            vec!["1", "Doe; Jane", "Paris"],
            vec!["2", "O'Hara, Scarlett", "Tara"],
        ]
    );
    Ok(())
}

#[test]
fn test_failing_statement_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let (foo, _) = create_foo_bar(dir.path())?;

    let err = query_csv(
        &["select nope from foo", "select * from foo"],
        &[CsvInput::new(foo)],
        memory(),
        &ImportOptions::default(),
    )
    .unwrap_err();
    match err {
        QueryCsvError::StatementExecution { statement, .. } => {
            assert_eq!(statement, "select nope from foo")
        }
        other => panic!("Unexpected error type: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_empty_input_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = create_temp_dir()?;
    let empty = create_file(dir.path(), "empty.csv", "")?;

    let err = query_csv(
        &["select 1"],
        &[CsvInput::new(empty)],
        memory(),
        &ImportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, QueryCsvError::MalformedSource { .. }));
    Ok(())
}
