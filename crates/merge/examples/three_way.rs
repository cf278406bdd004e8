use anyhow::Result;
use chunk_merge::{ConflictSide, DiffConfig, MergeData, MergeError};

fn print_side(merge: &MergeData, side: ConflictSide) -> Result<()> {
    println!("  {}:", side);
    for (i, chunk) in merge.diff(side).change_chunks().iter().enumerate() {
        if !chunk.has_changes() {
            continue;
        }
        println!(
            "    Chunk {}: {} base {:?} -> {:?} [{}]",
            i,
            chunk.change_type,
            chunk.old_range.to_range(),
            chunk.new_text,
            merge.conflict(side, i)?
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let base = "fn main() {\n    let x = 1;\n    println!(\"{}\", x);\n}\n";
    let yours = "fn main() {\n    let x = 2;\n    println!(\"{}\", x);\n}\n";
    let theirs = "// entry point\nfn main() {\n    let x = 3;\n    println!(\"{}\", x);\n}\n";

    let mut merge = MergeData::from_texts(base, yours, theirs, &DiffConfig::default())?;
    println!("Initial state:");
    print_side(&merge, ConflictSide::Yours)?;
    print_side(&merge, ConflictSide::Theirs)?;

    // Nothing can be resolved automatically while `x` conflicts
    println!("\nAuto resolve: {:?}", merge.try_auto_resolve()?);

    let accepted = merge.accept_non_conflicting(ConflictSide::Theirs)?;
    println!("Accepted {} non-conflicting chunk(s) of theirs", accepted);

    let conflicting = merge
        .diff(ConflictSide::Yours)
        .change_chunks()
        .iter()
        .position(|c| c.has_changes())
        .unwrap_or(0);
    match merge.accept_chunk(ConflictSide::Yours, conflicting) {
        Err(MergeError::UnresolvedConflictWrite { side, index }) => {
            println!("Chunk {} of {} still conflicts, discarding theirs", index, side);
        }
        other => other?,
    }

    // Decide in favour of yours
    for (i, chunk) in merge.diff(ConflictSide::Theirs).clone().change_chunks().iter().enumerate() {
        if chunk.is_pending() && chunk.has_changes() {
            merge.discard_change(ConflictSide::Theirs, i)?;
        }
    }
    merge.accept_chunk(ConflictSide::Yours, conflicting)?;

    println!("\nFinal state:");
    print_side(&merge, ConflictSide::Yours)?;
    print_side(&merge, ConflictSide::Theirs)?;
    println!("\nResolved text ({}):\n{}", merge.line_ending(), merge.resolved_text());

    Ok(())
}
