use anyhow::Result;
use chunk_diff::{ChangeSide, DiffConfig, FileDiff, TextComparator};

fn print_chunks(diff: &FileDiff) {
    for (i, chunk) in diff.change_chunks().iter().enumerate() {
        println!(
            "  Chunk {}: {:<6} old {:?} new {:?}",
            i,
            chunk.change_type,
            chunk.old_range.to_range(),
            chunk.new_range.to_range()
        );
    }
}

fn main() -> Result<()> {
    // RUST_LOG=debug shows how each edit is mapped onto lines
    env_logger::init();

    let old = "fn main() {\n    println!(\"Hello, world!\");\n}\n";
    let new = "fn main() {\n    let name = \"Rust\";\n    println!(\"Hello, {}!\", name);\n}\n";

    let mut diff = FileDiff::from_texts(old, new)?;
    println!("Initial diff:");
    print_chunks(&diff);
    println!("  Added lines: {}", diff.sequence().added_lines());
    println!("  Deleted lines: {}", diff.sequence().deleted_lines());

    // Type a comment line at the top of the old text
    diff.apply_live_edit(0, "// greeting\n", 0)?;
    println!("\nAfter inserting a comment line:");
    print_chunks(&diff);

    // Replace "world" with "Rust" in place
    let text = diff.text_on_side(ChangeSide::Old);
    if let Some(byte_offset) = text.find("world") {
        let offset = text[..byte_offset].chars().count();
        diff.apply_live_edit(offset, "Rust", "world".len())?;
    }
    println!("\nAfter editing the greeting:");
    print_chunks(&diff);
    println!("\nOld side now reads:\n{}", diff.text_on_side(ChangeSide::Old));

    // A full recompute with a whitespace-insensitive comparator
    let config = DiffConfig::default().comparator(TextComparator::IgnoreAll);
    diff.recompute(&config)?;
    println!("Recomputed ({}):", config.comparator_kind());
    print_chunks(&diff);

    Ok(())
}
