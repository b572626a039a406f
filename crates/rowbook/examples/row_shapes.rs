//! Demonstrates the four row shapes offered by the reader.
//!
//! Run with: cargo run --example row_shapes

use rowbook::{row, Result, WorkbookWriter};

fn main() -> Result<()> {
    let mut writer = WorkbookWriter::new();
    writer
        .add_row(row!["Name", "Age", "City"])?
        .add_row(row!["Alice", 30, "NYC"])?
        .add_row(row!["Bob", 25, "LA, CA"])?;

    let reader = writer.to_reader()?;
    println!("header: {:?}\n", reader.header()?);

    println!("-- delimited lines (note the quoted cell) --");
    for line in reader.to_csv()? {
        println!("{line}");
    }

    println!("\n-- lists --");
    for list in reader.to_lists()? {
        println!("{list:?}");
    }

    println!("\n-- fixed arrays --");
    for array in reader.to_arrays()? {
        println!("{} cells: {array:?}", array.len());
    }

    println!("\n-- header-keyed maps --");
    for map in reader.to_maps()? {
        println!("{map:?}");
    }

    Ok(())
}
